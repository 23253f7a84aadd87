use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use soltys_formats::SayReader;

/// References below this value are system texts: interface strings the
/// engine asks for constantly. They are evicted only as a last resort.
pub const SYSTEM_TEXT_MAX: u32 = 1000;

pub const DEFAULT_CACHE_SIZE: usize = 128;

const SAY_EXT: &str = "say";

#[derive(Debug, Clone, Default)]
struct Slot {
    ref_id: u32,
    text: Option<String>,
}

/// Fixed-size cache of dialogue lines over a say bank. Reference 0 marks a
/// free slot; lines load lazily and the bank's reference ordering lets a
/// single-line load stop scanning as soon as it has passed its target.
#[derive(Debug)]
pub struct TextBank {
    path: PathBuf,
    cache: Vec<Slot>,
}

impl TextBank {
    pub fn open<P: AsRef<Path>>(path: P, size: usize) -> Result<Self> {
        let mut path = path.as_ref().to_path_buf();
        if path.extension().is_none() {
            path.set_extension(SAY_EXT);
        }
        if !path.is_file() {
            bail!("no dialogue bank at {}", path.display());
        }
        Ok(TextBank {
            path,
            cache: vec![Slot::default(); size],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn cached_count(&self) -> usize {
        self.cache.iter().filter(|slot| slot.ref_id != 0).count()
    }

    fn find(&self, ref_id: u32) -> Option<usize> {
        self.cache.iter().position(|slot| slot.ref_id == ref_id)
    }

    /// Frees every slot whose reference falls inside `from..upto`.
    pub fn clear_range(&mut self, from: u32, upto: u32) {
        for slot in &mut self.cache {
            if slot.ref_id != 0 && slot.ref_id >= from && slot.ref_id < upto {
                *slot = Slot::default();
            }
        }
    }

    pub fn clear_all(&mut self) {
        self.clear_range(1, u32::MAX);
    }

    /// One pass over the bank, pinning every in-range line into the cache.
    /// A line whose reference is already cached reuses its slot; otherwise
    /// the first free slot takes it. Stops once the cache is full.
    pub fn preload(&mut self, from: u32, upto: u32) -> Result<()> {
        let reader = SayReader::open(&self.path)?;
        for record in reader {
            let record = record?;
            if record.ref_id == 0 || record.ref_id < from || record.ref_id >= upto {
                continue;
            }
            let slot = match self.find(record.ref_id).or_else(|| self.find(0)) {
                Some(index) => index,
                None => break,
            };
            self.cache[slot] = Slot {
                ref_id: record.ref_id,
                text: Some(record.text),
            };
        }
        Ok(())
    }

    fn load(&mut self, slot: usize, ref_id: u32) -> Result<bool> {
        let reader = SayReader::open(&self.path)?;
        for record in reader {
            let record = record?;
            if record.ref_id < ref_id {
                continue;
            }
            if record.ref_id > ref_id {
                break;
            }
            self.cache[slot] = Slot {
                ref_id,
                text: Some(record.text),
            };
            return Ok(true);
        }
        Ok(false)
    }

    /// Cache hit, or load into a free slot; under pressure evicts non-system
    /// texts first and everything only when that was not enough. `None`
    /// means the bank has no such line.
    pub fn get_text(&mut self, ref_id: u32) -> Result<Option<&str>> {
        if let Some(index) = self.find(ref_id) {
            return Ok(self.cache[index].text.as_deref());
        }

        let slot = match self.find(0) {
            Some(index) => index,
            None => {
                self.clear_range(SYSTEM_TEXT_MAX, u32::MAX);
                match self.find(0) {
                    Some(index) => index,
                    None => {
                        log::warn!(
                            "dialogue cache exhausted by system texts; clearing everything"
                        );
                        self.clear_all();
                        0
                    }
                }
            }
        };

        if self.load(slot, ref_id)? {
            Ok(self.cache[slot].text.as_deref())
        } else {
            Ok(None)
        }
    }
}
