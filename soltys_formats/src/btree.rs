use std::cmp::Ordering;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub const PAGE_SIZE: usize = 1024;
pub const KEY_LEN: usize = 13;

const PAGE_HEADER_SIZE: usize = 4;
const INNER_ENTRY_SIZE: usize = KEY_LEN + 2;
const LEAF_ENTRY_SIZE: usize = KEY_LEN + 4 + 2;

pub const INNER_PER_PAGE: usize = (PAGE_SIZE - PAGE_HEADER_SIZE) / INNER_ENTRY_SIZE;
pub const LEAF_PER_PAGE: usize = (PAGE_SIZE - PAGE_HEADER_SIZE) / LEAF_ENTRY_SIZE;

const NO_PAGE: u16 = 0xFFFF;
const ROOT_PAGE: u16 = 0;
const LEVELS: usize = 2;

/// Fixed-length catalog key. Names are NUL-padded to 13 bytes and compared
/// ASCII case-insensitively over the full stored width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key([u8; KEY_LEN]);

impl Key {
    pub fn new(name: &str) -> Self {
        let mut bytes = [0u8; KEY_LEN];
        for (slot, byte) in bytes.iter_mut().zip(name.bytes()) {
            *slot = byte;
        }
        Key(bytes)
    }

    pub fn as_str(&self) -> String {
        let end = self
            .0
            .iter()
            .position(|&byte| byte == 0)
            .unwrap_or(KEY_LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }

    pub fn compare(&self, other: &Key) -> Ordering {
        let lhs = self.0.iter().map(u8::to_ascii_lowercase);
        let rhs = other.0.iter().map(u8::to_ascii_lowercase);
        lhs.cmp(rhs)
    }

    fn read_from(reader: &mut impl Read) -> io::Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        reader.read_exact(&mut bytes)?;
        Ok(Key(bytes))
    }

    fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writer.write_all(&self.0)
    }
}

/// Leaf record: catalog key plus the offset/length of the payload inside the
/// paired data volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPack {
    pub key: Key,
    pub mark: u32,
    pub size: u16,
}

impl KeyPack {
    pub fn new(name: &str, mark: u32, size: u16) -> Self {
        KeyPack {
            key: Key::new(name),
            mark,
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InnerEntry {
    key: Key,
    down: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Page {
    Inner { down: u16, entries: Vec<InnerEntry> },
    Leaf { records: Vec<KeyPack> },
}

impl Page {
    fn empty_leaf() -> Self {
        Page::Leaf {
            records: Vec::new(),
        }
    }

    fn decode(raw: &[u8; PAGE_SIZE]) -> Result<Self> {
        let mut cursor = io::Cursor::new(&raw[..]);
        let count = cursor.read_u16::<LittleEndian>()? as usize;
        let down = cursor.read_u16::<LittleEndian>()?;

        if down == NO_PAGE {
            ensure!(
                count <= LEAF_PER_PAGE,
                "leaf page holds {count} records, capacity is {LEAF_PER_PAGE}"
            );
            let mut records = Vec::with_capacity(count);
            for _ in 0..count {
                let key = Key::read_from(&mut cursor)?;
                let mark = cursor.read_u32::<LittleEndian>()?;
                let size = cursor.read_u16::<LittleEndian>()?;
                records.push(KeyPack { key, mark, size });
            }
            Ok(Page::Leaf { records })
        } else {
            ensure!(
                count <= INNER_PER_PAGE,
                "inner page holds {count} entries, capacity is {INNER_PER_PAGE}"
            );
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                let key = Key::read_from(&mut cursor)?;
                let child = cursor.read_u16::<LittleEndian>()?;
                entries.push(InnerEntry { key, down: child });
            }
            Ok(Page::Inner { down, entries })
        }
    }

    fn encode(&self) -> Result<[u8; PAGE_SIZE]> {
        let mut raw = [0u8; PAGE_SIZE];
        let mut cursor = io::Cursor::new(&mut raw[..]);
        match self {
            Page::Inner { down, entries } => {
                ensure!(
                    entries.len() <= INNER_PER_PAGE,
                    "inner page overflows its capacity"
                );
                cursor.write_u16::<LittleEndian>(entries.len() as u16)?;
                cursor.write_u16::<LittleEndian>(*down)?;
                for entry in entries {
                    entry.key.write_to(&mut cursor)?;
                    cursor.write_u16::<LittleEndian>(entry.down)?;
                }
            }
            Page::Leaf { records } => {
                ensure!(
                    records.len() <= LEAF_PER_PAGE,
                    "leaf page overflows its capacity"
                );
                cursor.write_u16::<LittleEndian>(records.len() as u16)?;
                cursor.write_u16::<LittleEndian>(NO_PAGE)?;
                for pack in records {
                    pack.key.write_to(&mut cursor)?;
                    cursor.write_u32::<LittleEndian>(pack.mark)?;
                    cursor.write_u16::<LittleEndian>(pack.size)?;
                }
            }
        }
        Ok(raw)
    }
}

#[derive(Debug)]
struct PageSlot {
    page: Page,
    page_no: u16,
    dirty: bool,
}

impl PageSlot {
    fn empty() -> Self {
        PageSlot {
            page: Page::empty_leaf(),
            page_no: NO_PAGE,
            dirty: false,
        }
    }
}

/// One owned page slot per tree level. Replacing the page cached in a slot
/// writes the previous occupant back iff its dirty bit is set.
#[derive(Debug)]
struct PageCache {
    slots: [PageSlot; LEVELS],
}

impl PageCache {
    fn new() -> Self {
        PageCache {
            slots: [PageSlot::empty(), PageSlot::empty()],
        }
    }

    /// Read-only fetch. Pages past the end of the file report `None`.
    fn fetch(&mut self, level: usize, page_no: u16, file: &mut File) -> Result<Option<&Page>> {
        if self.slots[level].page_no != page_no {
            if !self.slot_load(level, page_no, file, false)? {
                return Ok(None);
            }
        }
        Ok(Some(&self.slots[level].page))
    }

    /// Build-path fetch. Pages past the end of the file materialize as fresh
    /// zeroed leaves with the dirty bit already set.
    fn fetch_or_create(
        &mut self,
        level: usize,
        page_no: u16,
        file: &mut File,
    ) -> Result<&mut Page> {
        if self.slots[level].page_no != page_no {
            self.slot_load(level, page_no, file, true)?;
        }
        Ok(&mut self.slots[level].page)
    }

    fn slot_load(
        &mut self,
        level: usize,
        page_no: u16,
        file: &mut File,
        create: bool,
    ) -> Result<bool> {
        self.put_page(level, file, false)?;

        let pos = page_no as u64 * PAGE_SIZE as u64;
        let len = file.metadata().context("querying index file length")?.len();
        let slot = &mut self.slots[level];

        if pos < len {
            file.seek(SeekFrom::Start(pos))?;
            let mut raw = [0u8; PAGE_SIZE];
            file.read_exact(&mut raw)
                .with_context(|| format!("reading catalog page {page_no}"))?;
            slot.page = Page::decode(&raw).with_context(|| format!("decoding catalog page {page_no}"))?;
            slot.dirty = false;
        } else if create {
            slot.page = Page::empty_leaf();
            slot.dirty = true;
        } else {
            return Ok(false);
        }

        slot.page_no = page_no;
        Ok(true)
    }

    fn mark_dirty(&mut self, level: usize) {
        self.slots[level].dirty = true;
    }

    fn put_page(&mut self, level: usize, file: &mut File, hard: bool) -> Result<()> {
        let slot = &mut self.slots[level];
        if (hard || slot.dirty) && slot.page_no != NO_PAGE {
            let raw = slot.page.encode()?;
            file.seek(SeekFrom::Start(slot.page_no as u64 * PAGE_SIZE as u64))?;
            file.write_all(&raw)
                .with_context(|| format!("writing catalog page {}", slot.page_no))?;
            slot.dirty = false;
        }
        Ok(())
    }

    fn flush(&mut self, file: &mut File) -> Result<()> {
        for level in 0..LEVELS {
            self.put_page(level, file, false)?;
        }
        Ok(())
    }
}

/// Reader over a two-level catalog index: a root page of separators followed
/// by leaf pages of key packs. One page per level stays buffered across
/// lookups.
#[derive(Debug)]
pub struct BtreeFile {
    path: PathBuf,
    file: File,
    cache: PageCache,
}

impl BtreeFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .with_context(|| format!("opening catalog index {}", path.display()))?;
        Ok(BtreeFile {
            path,
            file,
            cache: PageCache::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Walks root to leaf and returns the record occupying the slot where
    /// `name` would live. Equality is not required; `find` is the exact
    /// variant.
    pub fn seek(&mut self, name: &str) -> Result<Option<KeyPack>> {
        let key = Key::new(name);
        let mut level = 0;
        let mut next = ROOT_PAGE;

        loop {
            ensure!(
                level < LEVELS,
                "catalog {} nests deeper than two levels",
                self.path.display()
            );

            let page = match self.cache.fetch(level, next, &mut self.file)? {
                Some(page) => page,
                None if level == 0 => return Ok(None),
                None => bail!(
                    "catalog page {next} missing from {}",
                    self.path.display()
                ),
            };

            match page {
                Page::Inner { down, entries } => {
                    let mut chosen = *down;
                    for entry in entries {
                        if key.compare(&entry.key) == Ordering::Less {
                            break;
                        }
                        chosen = entry.down;
                    }
                    next = chosen;
                    level += 1;
                }
                Page::Leaf { records } => {
                    if records.is_empty() {
                        return Ok(None);
                    }
                    let mut index = records.len() - 1;
                    for (i, pack) in records[..records.len() - 1].iter().enumerate() {
                        if key.compare(&pack.key) != Ordering::Greater {
                            index = i;
                            break;
                        }
                    }
                    return Ok(Some(records[index]));
                }
            }
        }
    }

    pub fn find(&mut self, name: &str) -> Result<Option<KeyPack>> {
        let key = Key::new(name);
        Ok(self
            .seek(name)?
            .filter(|pack| key.compare(&pack.key) == Ordering::Equal))
    }

    /// All records in key order, for catalog listings.
    pub fn records(&mut self) -> Result<Vec<KeyPack>> {
        let leaves: Vec<u16> = match self.cache.fetch(0, ROOT_PAGE, &mut self.file)? {
            Some(Page::Inner { down, entries }) => {
                let mut pages = vec![*down];
                pages.extend(entries.iter().map(|entry| entry.down));
                pages
            }
            Some(Page::Leaf { .. }) => bail!(
                "catalog {} has a leaf where the root should be",
                self.path.display()
            ),
            None => return Ok(Vec::new()),
        };

        let mut all = Vec::new();
        for page_no in leaves {
            match self.cache.fetch(1, page_no, &mut self.file)? {
                Some(Page::Leaf { records }) => all.extend(records.iter().copied()),
                Some(Page::Inner { .. }) => {
                    bail!("catalog leaf page {page_no} is an inner page")
                }
                None => bail!(
                    "catalog page {page_no} missing from {}",
                    self.path.display()
                ),
            }
        }
        Ok(all)
    }
}

/// Bulk constructor: sorts the records, fills leaves to capacity, and grows
/// the root by one separator per filled leaf. The index never rebalances
/// afterwards.
#[derive(Debug)]
pub struct BtreeBuilder {
    path: PathBuf,
    file: File,
    cache: PageCache,
}

impl BtreeBuilder {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("creating catalog index {}", path.display()))?;
        Ok(BtreeBuilder {
            path,
            file,
            cache: PageCache::new(),
        })
    }

    pub fn build(mut self, records: &mut [KeyPack]) -> Result<()> {
        records.sort_by(|a, b| a.key.compare(&b.key));

        {
            let root = self.cache.fetch_or_create(0, ROOT_PAGE, &mut self.file)?;
            *root = Page::Inner {
                down: 1,
                entries: Vec::new(),
            };
            self.cache.mark_dirty(0);
        }
        self.cache.put_page(0, &mut self.file, true)?;

        let mut leaf_no: u16 = 1;
        let mut filled = 0usize;
        self.cache.fetch_or_create(1, leaf_no, &mut self.file)?;

        for pack in records.iter().copied() {
            if filled >= LEAF_PER_PAGE {
                self.cache.put_page(1, &mut self.file, true)?;
                leaf_no = leaf_no
                    .checked_add(1)
                    .context("catalog leaf page number overflow")?;
                self.cache.fetch_or_create(1, leaf_no, &mut self.file)?;
                filled = 0;

                let root = self.cache.fetch_or_create(0, ROOT_PAGE, &mut self.file)?;
                let Page::Inner { entries, .. } = root else {
                    bail!("root page of {} is not an inner page", self.path.display());
                };
                ensure!(
                    entries.len() < INNER_PER_PAGE,
                    "catalog {} overflows the root page",
                    self.path.display()
                );
                entries.push(InnerEntry {
                    key: pack.key,
                    down: leaf_no,
                });
                self.cache.mark_dirty(0);
            }

            let leaf = self.cache.fetch_or_create(1, leaf_no, &mut self.file)?;
            let Page::Leaf { records } = leaf else {
                bail!("catalog leaf page {leaf_no} is not a leaf");
            };
            records.push(pack);
            self.cache.mark_dirty(1);
            filled += 1;
        }

        self.cache.flush(&mut self.file)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn build_index(names: &[String]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        let mut records: Vec<KeyPack> = names
            .iter()
            .enumerate()
            .map(|(i, name)| KeyPack::new(name, i as u32 * 64, 64))
            .collect();
        BtreeBuilder::create(file.path())
            .unwrap()
            .build(&mut records)
            .unwrap();
        file
    }

    #[test]
    fn build_and_find_spans_multiple_leaves() {
        let names: Vec<String> = (0..130).map(|i| format!("ASSET{i:03}.SPR")).collect();
        let file = build_index(&names);
        let mut index = BtreeFile::open(file.path()).unwrap();

        for (i, name) in names.iter().enumerate() {
            let pack = index.find(name).unwrap().expect("record should be present");
            assert_eq!(pack.mark, i as u32 * 64);
            assert_eq!(pack.size, 64);
        }

        assert!(index.find("MISSING.SPR").unwrap().is_none());
        assert_eq!(index.records().unwrap().len(), names.len());
    }

    #[test]
    fn lookups_fold_ascii_case() {
        let names = vec!["Vault.Bmp".to_string(), "intro.say".to_string()];
        let file = build_index(&names);
        let mut index = BtreeFile::open(file.path()).unwrap();

        assert!(index.find("VAULT.BMP").unwrap().is_some());
        assert!(index.find("vault.bmp").unwrap().is_some());
        assert!(index.find("INTRO.SAY").unwrap().is_some());
    }

    #[test]
    fn seek_lands_on_the_nearest_slot() {
        let names = vec![
            "ALPHA".to_string(),
            "DELTA".to_string(),
            "OMEGA".to_string(),
        ];
        let file = build_index(&names);
        let mut index = BtreeFile::open(file.path()).unwrap();

        let pack = index.seek("BETA").unwrap().expect("seek should land");
        assert_eq!(pack.key.as_str(), "DELTA");
        assert!(index.find("BETA").unwrap().is_none());

        // Past every key the final record is the landing slot.
        let pack = index.seek("ZULU").unwrap().expect("seek should land");
        assert_eq!(pack.key.as_str(), "OMEGA");
    }

    #[test]
    fn empty_index_reports_no_records() {
        let file = NamedTempFile::new().unwrap();
        BtreeBuilder::create(file.path())
            .unwrap()
            .build(&mut [])
            .unwrap();

        let mut index = BtreeFile::open(file.path()).unwrap();
        assert!(index.find("ANY").unwrap().is_none());
        assert!(index.seek("ANY").unwrap().is_none());
        assert!(index.records().unwrap().is_empty());
    }

    #[test]
    fn empty_file_is_an_empty_index() {
        let file = NamedTempFile::new().unwrap();
        let mut index = BtreeFile::open(file.path()).unwrap();
        assert!(index.find("ANY").unwrap().is_none());
    }

    #[test]
    fn exact_leaf_fill_emits_no_dangling_separator() {
        let names: Vec<String> = (0..LEAF_PER_PAGE).map(|i| format!("K{i:05}")).collect();
        let file = build_index(&names);

        // Root plus exactly one leaf page.
        let len = std::fs::metadata(file.path()).unwrap().len();
        assert_eq!(len, 2 * PAGE_SIZE as u64);

        let mut index = BtreeFile::open(file.path()).unwrap();
        assert_eq!(index.records().unwrap().len(), LEAF_PER_PAGE);
        assert!(index.find("K00000").unwrap().is_some());
        assert!(
            index
                .find(&format!("K{:05}", LEAF_PER_PAGE - 1))
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn one_past_leaf_fill_opens_a_second_leaf() {
        let names: Vec<String> = (0..LEAF_PER_PAGE + 1).map(|i| format!("K{i:05}")).collect();
        let file = build_index(&names);

        let len = std::fs::metadata(file.path()).unwrap().len();
        assert_eq!(len, 3 * PAGE_SIZE as u64);

        let mut index = BtreeFile::open(file.path()).unwrap();
        for name in &names {
            assert!(index.find(name).unwrap().is_some(), "missing {name}");
        }
    }

    #[test]
    fn pages_round_trip_bit_exactly() {
        let inner = Page::Inner {
            down: 1,
            entries: vec![
                InnerEntry {
                    key: Key::new("MIDDLE"),
                    down: 2,
                },
                InnerEntry {
                    key: Key::new("UPPER"),
                    down: 3,
                },
            ],
        };
        let leaf = Page::Leaf {
            records: vec![KeyPack::new("ASSET.BMP", 42, 512)],
        };

        for page in [inner, leaf] {
            let raw = page.encode().unwrap();
            let decoded = Page::decode(&raw).unwrap();
            assert_eq!(decoded, page);
            assert_eq!(decoded.encode().unwrap(), raw);
        }
    }

    #[test]
    fn keys_truncate_to_stored_width() {
        let long = "A".repeat(KEY_LEN + 5);
        let key = Key::new(&long);
        assert_eq!(key.as_str().len(), KEY_LEN);
        assert_eq!(key.compare(&Key::new(&"a".repeat(KEY_LEN))), Ordering::Equal);
    }
}
