//! 运动前的操作员确认

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

/// 提示机械臂即将运动，等待回车
///
/// `assume_yes` 为 true 时只打印警告。
pub fn confirm_motion(assume_yes: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "WARNING: This example will move the robot! \
         Please make sure to have the user stop button at hand!"
    )?;
    if assume_yes {
        return Ok(());
    }

    write!(stdout, "Press Enter to continue...")?;
    stdout.flush()?;
    drop(stdout);

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read confirmation from stdin")?;
    Ok(())
}
