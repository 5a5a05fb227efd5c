use anyhow::Result;
use console::style;
use saldo_core::Journal;
use std::path::Path;

pub fn execute(path: &Path, count: usize) -> Result<()> {
    let journal = Journal::new(path);
    let sections = journal.recent(count)?;

    if sections.is_empty() {
        println!("{}", style("Journal is empty").yellow());
        return Ok(());
    }

    for (idx, section) in sections.iter().enumerate() {
        if idx > 0 {
            println!("---\n");
        }
        println!("{section}");
    }

    Ok(())
}
