//! The `skillcheck show` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub fn execute(bank_path: Option<PathBuf>, answers: bool) -> Result<()> {
    let bank = super::load_bank(bank_path.as_deref())?;

    println!("{} [{}]", bank.name, bank.id);
    if !bank.description.is_empty() {
        println!("{}", bank.description);
    }

    let mut table = Table::new();
    if answers {
        table.set_header(vec!["#", "Question", "Ideal answer"]);
    } else {
        table.set_header(vec!["#", "Question"]);
    }

    for (i, q) in bank.questions().iter().enumerate() {
        let mut row = vec![Cell::new(i + 1), Cell::new(&q.prompt)];
        if answers {
            row.push(Cell::new(&q.ideal_answer));
        }
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}
