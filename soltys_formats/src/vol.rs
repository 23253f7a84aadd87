use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use memmap2::{Mmap, MmapOptions};

use crate::btree::{BtreeBuilder, BtreeFile, KeyPack};

pub const CAT_EXT: &str = "cat";
pub const DAT_EXT: &str = "dat";

const DAT_MAGIC: &[u8; 3] = b"SVL";
const DAT_HEADER_SIZE: usize = 4;

pub const DEFAULT_SEED: u8 = 0xA5;

/// Rolling XOR mask over the payload bytes. Applying it twice with the same
/// seed restores the original buffer.
pub fn scramble(bytes: &mut [u8], seed: u8) {
    let mut mask = seed;
    for byte in bytes.iter_mut() {
        *byte ^= mask;
        mask = mask.wrapping_add(1);
    }
}

/// A game volume: a catalog index keyed by asset name next to a scrambled
/// data file. The catalog's key packs address slices of the data file.
#[derive(Debug)]
pub struct Volume {
    dat_path: PathBuf,
    catalog: BtreeFile,
    data: Mmap,
    seed: u8,
}

impl Volume {
    pub fn open(dir: &Path, stem: &str) -> Result<Self> {
        let cat_path = dir.join(format!("{stem}.{CAT_EXT}"));
        let dat_path = dir.join(format!("{stem}.{DAT_EXT}"));

        let catalog = BtreeFile::open(&cat_path)?;
        let file = File::open(&dat_path)
            .with_context(|| format!("opening data volume {}", dat_path.display()))?;
        let data = unsafe { MmapOptions::new().map(&file) }
            .with_context(|| format!("memory-mapping data volume {}", dat_path.display()))?;

        ensure!(
            data.len() >= DAT_HEADER_SIZE && &data[..3] == DAT_MAGIC,
            "{} is not a data volume (missing SVL header)",
            dat_path.display()
        );
        let seed = data[3];

        Ok(Volume {
            dat_path,
            catalog,
            data,
            seed,
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.dat_path
    }

    pub fn entries(&mut self) -> Result<Vec<KeyPack>> {
        self.catalog.records()
    }

    /// Looks a name up in the catalog and descrambles its payload slice.
    pub fn read(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let Some(pack) = self.catalog.find(name)? else {
            return Ok(None);
        };

        let start = pack.mark as usize;
        let end = start + pack.size as usize;
        ensure!(
            start >= DAT_HEADER_SIZE && end <= self.data.len(),
            "entry {name} addresses {start}..{end} outside data volume {}",
            self.dat_path.display()
        );

        let mut bytes = self.data[start..end].to_vec();
        scramble(&mut bytes, self.seed);
        Ok(Some(bytes))
    }
}

/// Packs (name, payload) pairs into a data file and bulk-builds the catalog
/// over them.
#[derive(Debug)]
pub struct VolumeWriter {
    cat_path: PathBuf,
    dat: File,
    records: Vec<KeyPack>,
    seed: u8,
    cursor: u32,
}

impl VolumeWriter {
    pub fn create(dir: &Path, stem: &str, seed: u8) -> Result<Self> {
        let cat_path = dir.join(format!("{stem}.{CAT_EXT}"));
        let dat_path = dir.join(format!("{stem}.{DAT_EXT}"));

        let mut dat = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&dat_path)
            .with_context(|| format!("creating data volume {}", dat_path.display()))?;
        dat.write_all(&[DAT_MAGIC[0], DAT_MAGIC[1], DAT_MAGIC[2], seed])
            .with_context(|| format!("writing header of {}", dat_path.display()))?;

        Ok(VolumeWriter {
            cat_path,
            dat,
            records: Vec::new(),
            seed,
            cursor: DAT_HEADER_SIZE as u32,
        })
    }

    pub fn append(&mut self, name: &str, payload: &[u8]) -> Result<()> {
        ensure!(
            payload.len() <= u16::MAX as usize,
            "payload for {name} is {} bytes, catalog size field holds at most {}",
            payload.len(),
            u16::MAX
        );

        let mut scrambled = payload.to_vec();
        scramble(&mut scrambled, self.seed);
        self.dat
            .write_all(&scrambled)
            .with_context(|| format!("appending {name} to the data volume"))?;

        self.records
            .push(KeyPack::new(name, self.cursor, payload.len() as u16));
        self.cursor += payload.len() as u32;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.dat.flush().context("flushing the data volume")?;
        BtreeBuilder::create(&self.cat_path)?.build(&mut self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn pack_and_read_round_trip() {
        let dir = tempdir().unwrap();

        let mut writer = VolumeWriter::create(dir.path(), "vol", DEFAULT_SEED).unwrap();
        writer.append("HERO.SPR", b"sprite bytes").unwrap();
        writer.append("INTRO.SAY", b"1=Hello!").unwrap();
        writer.finish().unwrap();

        let mut volume = Volume::open(dir.path(), "vol").unwrap();
        assert_eq!(
            volume.read("hero.spr").unwrap().as_deref(),
            Some(&b"sprite bytes"[..])
        );
        assert_eq!(
            volume.read("INTRO.SAY").unwrap().as_deref(),
            Some(&b"1=Hello!"[..])
        );
        assert!(volume.read("ABSENT").unwrap().is_none());
        assert_eq!(volume.entries().unwrap().len(), 2);
    }

    #[test]
    fn data_bytes_are_scrambled_on_disk() {
        let dir = tempdir().unwrap();

        let mut writer = VolumeWriter::create(dir.path(), "vol", 0x17).unwrap();
        writer.append("NOTE.TXT", b"plain text payload").unwrap();
        writer.finish().unwrap();

        let raw = std::fs::read(dir.path().join("vol.dat")).unwrap();
        assert!(!raw
            .windows(b"plain text payload".len())
            .any(|window| window == b"plain text payload"));
    }

    #[test]
    fn truncated_data_volume_is_an_error() {
        let dir = tempdir().unwrap();

        let mut writer = VolumeWriter::create(dir.path(), "vol", DEFAULT_SEED).unwrap();
        writer.append("BIG.BIN", &[0u8; 256]).unwrap();
        writer.finish().unwrap();

        let dat_path = dir.path().join("vol.dat");
        let raw = std::fs::read(&dat_path).unwrap();
        std::fs::write(&dat_path, &raw[..raw.len() / 2]).unwrap();

        let mut volume = Volume::open(dir.path(), "vol").unwrap();
        assert!(volume.read("BIG.BIN").is_err());
    }

    #[test]
    fn scramble_is_its_own_inverse() {
        let mut bytes = b"the quick brown fox".to_vec();
        scramble(&mut bytes, 0x3C);
        assert_ne!(&bytes[..], b"the quick brown fox");
        scramble(&mut bytes, 0x3C);
        assert_eq!(&bytes[..], b"the quick brown fox");
    }
}
