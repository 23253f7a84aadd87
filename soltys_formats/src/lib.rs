pub mod btree;
pub mod font;
pub mod say;
pub mod vol;

pub use btree::{BtreeBuilder, BtreeFile, Key, KeyPack};
pub use font::{Font, GLYPH_HEIGHT};
pub use say::{SayReader, SayRecord, parse_line};
pub use vol::{Volume, VolumeWriter};
