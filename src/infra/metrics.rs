// ============================================================
// Layer 6 — Loss Logger
// ============================================================
// Appends the model's current losses to a CSV file.
//
// Columns: epoch, step, then one column per registered loss,
// in registry order.
//
// Output file: <checkpoints_dir>/<name>/loss_log.csv
//
// Example CSV output:
//   epoch,step,recon
//   1,50,0.912345
//   2,100,0.604211
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

pub const LOSS_LOG_FILE: &str = "loss_log.csv";

/// Logs step-level losses to a CSV file for later analysis.
pub struct LossLogger {
    /// Full path to the CSV file
    csv_path:   PathBuf,
    /// Loss columns, in header order
    loss_names: Vec<String>,
}

impl LossLogger {
    /// Create a new LossLogger.
    /// Writes the CSV header if the file doesn't exist yet, so a
    /// resumed run keeps appending to the same log.
    pub fn new(dir: impl AsRef<Path>, loss_names: &[String]) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join(LOSS_LOG_FILE);

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            let mut header = vec!["epoch".to_string(), "step".to_string()];
            header.extend(loss_names.iter().cloned());
            writeln!(f, "{}", header.join(","))?;
            tracing::debug!("Created loss log: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, loss_names: loss_names.to_vec() })
    }

    /// Append one row. `losses` must follow the header's loss order.
    pub fn log(&self, epoch: usize, step: usize, losses: &[(String, f64)]) -> Result<()> {
        let names_match = losses.len() == self.loss_names.len()
            && losses.iter().zip(&self.loss_names).all(|((name, _), expected)| name == expected);
        if !names_match {
            bail!(
                "loss columns {:?} do not match the log header {:?}",
                losses.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
                self.loss_names,
            );
        }

        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let mut row = vec![epoch.to_string(), step.to_string()];
        row.extend(losses.iter().map(|(_, value)| format!("{value:.6}")));
        writeln!(f, "{}", row.join(","))?;

        tracing::debug!("Logged losses for epoch {} step {}", epoch, step);
        Ok(())
    }

    /// Return the path to the loss CSV file
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let tmp    = tempfile::tempdir().unwrap();
        let names  = vec!["recon".to_string(), "kl".to_string()];
        let logger = LossLogger::new(tmp.path(), &names).unwrap();

        logger
            .log(1, 10, &[("recon".into(), 0.5), ("kl".into(), 0.25)])
            .unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, ["epoch,step,recon,kl", "1,10,0.500000,0.250000"]);
    }

    #[test]
    fn test_reopening_keeps_existing_rows() {
        let tmp   = tempfile::tempdir().unwrap();
        let names = vec!["recon".to_string()];

        LossLogger::new(tmp.path(), &names).unwrap()
            .log(1, 1, &[("recon".into(), 1.0)])
            .unwrap();
        LossLogger::new(tmp.path(), &names).unwrap()
            .log(2, 2, &[("recon".into(), 0.5)])
            .unwrap();

        let content = fs::read_to_string(tmp.path().join(LOSS_LOG_FILE)).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_mismatched_columns_are_rejected() {
        let tmp    = tempfile::tempdir().unwrap();
        let logger = LossLogger::new(tmp.path(), &["recon".to_string()]).unwrap();
        assert!(logger.log(1, 1, &[("other".into(), 1.0)]).is_err());
    }
}
