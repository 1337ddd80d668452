/*! OPF files

OPF files are zip archives produced by Datavyu. The annotations live in the `db`
member ([container]), which can be decoded into a table ([table]).
!*/
pub mod container;
pub mod table;

pub use container::OpfFile;
pub use table::DbTable;
