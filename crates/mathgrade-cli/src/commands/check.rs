//! The `mathgrade check` command.

use anyhow::Result;

use mathgrade_core::expr::evaluate;
use mathgrade_core::scoring::format_answer;

pub fn execute(expression: &str) -> Result<()> {
    let value = evaluate(expression)?;
    println!("{expression} = {}", format_answer(value));
    Ok(())
}
