use crate::model::DutyBook;
use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub trait Storage {
    /// Charge un tableau de service depuis un support.
    fn load(&self) -> anyhow::Result<DutyBook>;
    /// Sauvegarde de manière atomique.
    fn save(&self, book: &DutyBook) -> anyhow::Result<()>;
}

pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Tableau vide si le fichier n'existe pas encore.
    pub fn load_or_default(&self) -> DutyBook {
        self.load().unwrap_or_default()
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<DutyBook> {
        let data =
            fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let book: DutyBook =
            serde_json::from_slice(&data).with_context(|| "parsing duty book")?;
        Ok(book)
    }

    fn save(&self, book: &DutyBook) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(book)?;
        let mut tmp =
            NamedTempFile::new_in(self.path.parent().unwrap_or_else(|| Path::new(".")))
                .with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}
