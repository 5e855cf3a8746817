use crate::error::Result;
use crate::event::Event;
use std::io::Write;

const HEADER: [&str; 8] = [
    "event_id",
    "event_name",
    "index",
    "timestamp",
    "voter_id",
    "candidate",
    "previous_hash",
    "hash",
];

/// Write the event's vote blocks (genesis excluded) as CSV.
pub fn export_csv<W: Write>(event: &Event, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for block in event.blockchain.votes() {
        let index = block.index.to_string();
        writer.write_record([
            event.event_id.as_str(),
            event.name.as_str(),
            index.as_str(),
            block.timestamp.as_str(),
            block.voter_id.as_str(),
            block.candidate.as_str(),
            block.previous_hash.as_str(),
            block.hash.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Suggested download name for an event's export.
pub fn export_file_name(event: &Event) -> String {
    format!("{}_blockchain.csv", event.event_id)
}
