//! The file manager provides unbuffered, low-level operations for working with paged data
//! files. It really doesn't know anything about the internal file formats of the data files,
//! except that the first two bytes of the first page must specify the type and page size for
//! the data file. (This is a requirement of [`open_dbfile`](fn.open_dbfile.html).)
//!
//! This module is the page-cache boundary of the engine: callers fetch pages with
//! [`load_dbpage`](fn.load_dbpage.html) (which hands the page back pinned), mutate them
//! through `DBPage`, and persist them with [`save_page`](fn.save_page.html) before unpinning.
//! Requesting a page just past the end of the file with the `create` flag set allocates a
//! fresh zero-filled page.
//!
//! # Design
//! Although it might make more sense to put per-file operations like "load page" and "store
//! page" on the `DBFile` class, we provide them at this level so that global buffering
//! capabilities could be added in one place.
//!
//! This module includes no multithreading support; callers are expected to be single-threaded
//! over any given file.

use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::ReadBytesExt;

use super::{DBFile, DBPage, PinError, Pinnable};
use super::dbfile::{self, DBFileType, encode_pagesize};
use super::dbpage;

#[derive(Debug, Clone, PartialEq)]
/// An error that can occur while working with paged files.
pub enum Error {
    /// The file being created already exists.
    DBFileExists(String),
    /// A `DBFile` error occurred.
    DBFileError(dbfile::Error),
    /// A `DBPage` error occurred.
    DBPageError(Box<dbpage::Error>),
    /// A pinning error occurred.
    PinError(PinError),
    /// An I/O error occurred.
    IOError,
    /// The file could not be created.
    CantCreateFile(String),
    /// The file could not be opened.
    CantOpenFile(String),
    /// The page requested lies past the end of the file.
    NotFullyRead,
    /// The page data could not be written back to the file.
    PageSaveError,
    /// The buffer handed in does not match the file's page size.
    IncorrectBufferSize,
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::DBFileExists(ref path) => {
                write!(f, "The file {} already exists.", path)
            }
            Error::DBFileError(ref e) => write!(f, "{}", e),
            Error::DBPageError(ref e) => write!(f, "{}", e),
            Error::PinError(ref e) => write!(f, "{}", e),
            Error::IOError => write!(f, "An IO error occurred."),
            Error::CantCreateFile(ref path) => write!(f, "The file {} cannot be created.", path),
            Error::CantOpenFile(ref path) => write!(f, "The file {} cannot be opened.", path),
            Error::NotFullyRead => {
                write!(f, "The page requested lies past the end of the file.")
            }
            Error::PageSaveError => write!(f, "The page could not be saved to the file."),
            Error::IncorrectBufferSize => {
                write!(f, "The buffer does not match the file's page size.")
            }
        }
    }
}

impl From<dbfile::Error> for Error {
    fn from(error: dbfile::Error) -> Error {
        Error::DBFileError(error)
    }
}

impl From<dbpage::Error> for Error {
    fn from(error: dbpage::Error) -> Error {
        Error::DBPageError(Box::new(error))
    }
}

impl From<io::Error> for Error {
    fn from(_: io::Error) -> Error {
        Error::IOError
    }
}

impl From<PinError> for Error {
    fn from(error: PinError) -> Error {
        Error::PinError(error)
    }
}

/// This helper function calculates the file-position of the specified page. Obviously, this
/// value is dependent on the page size.
fn get_page_start<F: Read + Seek + Write>(dbfile: &DBFile<F>, page_no: u32) -> u64 {
    (page_no as u64) * (dbfile.get_page_size() as u64)
}

/// Creates a new paged data file at the given path, writing the two-byte file header (file
/// type and encoded page size) into an otherwise empty first page.
///
/// # Arguments
/// * path - the location of the new file
/// * file_type - the type tag recorded in the file header
/// * page_size - the file's page size; must be valid per `dbfile::is_valid_pagesize`
///
/// # Errors
/// Fails if the file already exists, if the page size is invalid, or if the file cannot be
/// created or written.
pub fn create_dbfile<P: AsRef<Path>>(path: P,
                                     file_type: DBFileType,
                                     page_size: u32)
                                     -> Result<DBFile<File>, Error> {
    let path_string = path.as_ref().to_string_lossy().into_owned();
    if path.as_ref().exists() {
        return Err(Error::DBFileExists(path_string));
    }

    let encoded = try!(encode_pagesize(page_size));

    let mut file = try!(OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(path.as_ref())
        .map_err(|_| Error::CantCreateFile(path_string)));

    debug!("Creating paged file {} with page size {}.",
           path.as_ref().display(),
           page_size);

    // Write the first page up front so the header is present even before any tuple data is.
    let mut first_page = vec![0u8; page_size as usize];
    first_page[0] = file_type as u8;
    first_page[1] = encoded as u8;
    try!(file.write_all(&first_page));

    DBFile::with_path(file_type, page_size, file, path).map_err(Into::into)
}

/// Opens an existing paged data file, reading the file type and page size out of the two-byte
/// header at the start of the file.
///
/// # Arguments
/// * path - the location of the file to open
///
/// # Errors
/// Fails if the file cannot be opened, or if the header bytes do not describe a valid file.
pub fn open_dbfile<P: AsRef<Path>>(path: P) -> Result<DBFile<File>, Error> {
    let path_string = path.as_ref().to_string_lossy().into_owned();
    let mut file = try!(OpenOptions::new()
        .read(true)
        .write(true)
        .open(path.as_ref())
        .map_err(|_| Error::CantOpenFile(path_string)));

    let type_id = try!(file.read_u8());
    let encoded_size = try!(file.read_u8());
    let page_size = try!(dbfile::decode_pagesize(encoded_size as u32));

    debug!("Opened paged file {}: type {:?}, page size {}.",
           path.as_ref().display(),
           DBFileType::from(type_id),
           page_size);

    DBFile::with_path(type_id.into(), page_size, file, path).map_err(Into::into)
}

/// Saves a page to the DB file. Note that the data might not actually be written to disk
/// until a sync operation is performed.
///
/// # Arguments
/// * dbfile - the data file to write to
/// * page_no - the page number to write the buffer to
/// * buffer - the data to write back to the page
///
/// # Errors
/// This function will return an error in the following situations:
///
/// * If the buffer length is not the same as the page size.
/// * If an I/O error occurs while writing.
pub fn save_page<F: Read + Seek + Write>(dbfile: &mut DBFile<F>,
                                         page_no: u32,
                                         buffer: &[u8])
                                         -> Result<(), Error> {
    if buffer.len() as u32 != dbfile.get_page_size() {
        return Err(Error::IncorrectBufferSize);
    }

    let page_start = get_page_start(dbfile, page_no);

    let save_result = dbfile.seek(SeekFrom::Start(page_start))
        .and_then(|_| dbfile.write(buffer));
    match save_result {
        Ok(written) => {
            if written == buffer.len() {
                trace!("Saved page {} at file offset {}.", page_no, page_start);
                Ok(())
            } else {
                Err(Error::PageSaveError)
            }
        }
        Err(_) => Err(Error::PageSaveError),
    }
}

/// Loads a page from the underlying data file into the provided buffer. The `create` flag
/// controls whether an error is propagated if the requested page is past the end of the file;
/// a created page comes back zero-filled, and the file's size will not reflect the new page
/// until it is actually written back.
///
/// *This function does no page caching whatsoever.* Requesting a particular page multiple
/// times will return the data loaded from the file each time.
///
/// # Arguments
/// * dbfile - the database file to load the page from
/// * page_no - the number of the page to load
/// * buffer - the buffer to read the page into
/// * create - a flag specifying whether the page should be created if it doesn't already
///   exist
///
/// # Errors
/// This function will return an error in the following situations:
///
/// * If the buffer length is not the same as the page size.
/// * If the page lies past the end of the file and `create` was not requested
///   (`NotFullyRead`).
/// * If an I/O error occurs while reading.
pub fn load_page<F: Read + Seek + Write>(dbfile: &mut DBFile<F>,
                                         page_no: u32,
                                         buffer: &mut [u8],
                                         create: bool)
                                         -> Result<(), Error> {
    if buffer.len() as u32 != dbfile.get_page_size() {
        return Err(Error::IncorrectBufferSize);
    }

    let page_start = get_page_start(dbfile, page_no);

    let read_result = dbfile.seek(SeekFrom::Start(page_start))
        .and_then(|_| dbfile.read_exact(buffer));

    match read_result {
        Ok(()) => Ok(()),
        Err(ref e) if e.kind() == ErrorKind::UnexpectedEof => {
            if create {
                // Caller wants the page created if it doesn't exist yet. The page's contents
                // are simply zeroes; the file itself is not extended until the page is saved.
                debug!("Requested page {} doesn't yet exist; creating.", page_no);
                for byte in buffer.iter_mut() {
                    *byte = 0;
                }
                Ok(())
            } else {
                Err(Error::NotFullyRead)
            }
        }
        Err(_) => Err(Error::IOError),
    }
}

/// This method returns a database page to use, reading it from the specified data file. The
/// page is handed back pinned on behalf of the caller; the caller is responsible for
/// unpinning it (after saving it, if it was dirtied).
///
/// The `create` flag controls whether an error is propagated, if the requested page is past
/// the current end of the data file. (Note that if a new page is created, the file's size
/// will not reflect the new page until it is actually written to the file.)
///
/// # Arguments
/// * dbfile - The database file to load the page from.
/// * page_no - The number of the page to load.
/// * create - A flag specifying whether the page should be created if it doesn't already
///   exist.
pub fn load_dbpage<F: Read + Seek + Write>(dbfile: &mut DBFile<F>,
                                           page_no: u32,
                                           create: bool)
                                           -> Result<DBPage, Error> {
    let mut page = try!(DBPage::new(&dbfile.file_info, page_no));
    try!(load_page(dbfile, page_no, &mut page.page_data, create));
    page.pin();
    Ok(page)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempdir::TempDir;

    use super::*;
    use ::storage::Pinnable;
    use ::storage::dbfile::DBFileType;

    lazy_static! {
        static ref DIR: TempDir = {
            if let Ok(dir) = TempDir::new("test_dbfiles") {
                dir
            } else {
                panic!("Unable to create test_dbfiles directory!");
            }
        };
    }

    fn temp_path(name: &str) -> PathBuf {
        DIR.path().join(name)
    }

    #[test]
    fn test_create_and_open() {
        let path = temp_path("create.tbl");

        {
            let dbfile = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();
            assert_eq!(512, dbfile.get_page_size());
        }

        // Creating over an existing file is an error.
        assert_eq!(Err(Error::DBFileExists(path.to_string_lossy().into_owned())),
                   create_dbfile(&path, DBFileType::HeapTupleFile, 512).map(|_| ()));

        // The header written at creation time is read back at open time.
        let dbfile = open_dbfile(&path).unwrap();
        assert_eq!(DBFileType::HeapTupleFile, dbfile.file_type);
        assert_eq!(512, dbfile.get_page_size());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_save_round_trip() {
        let path = temp_path("round_trip.tbl");
        let mut dbfile = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();

        // Page 1 does not exist yet.
        assert!(load_dbpage(&mut dbfile, 1, false).is_err());

        // Creating it yields a pinned, zero-filled page.
        let mut page = load_dbpage(&mut dbfile, 1, true).unwrap();
        assert!(page.is_pinned());
        assert!(page.page_data.iter().all(|b| *b == 0));

        page.init_new_page().unwrap();
        page.alloc_new_tuple(16).unwrap();
        save_page(&mut dbfile, 1, &page.page_data).unwrap();
        page.set_dirty(false);
        page.unpin().unwrap();

        // The saved layout comes back on the next load.
        let mut reloaded = load_dbpage(&mut dbfile, 1, false).unwrap();
        assert_eq!(1, reloaded.get_num_slots().unwrap());
        assert_eq!(496, reloaded.get_slot_value(0).unwrap());
        reloaded.unpin().unwrap();

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_page_wrong_buffer_size() {
        let path = temp_path("wrong_size.tbl");
        let mut dbfile = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();

        let buffer = vec![0u8; 128];
        assert_eq!(Err(Error::IncorrectBufferSize), save_page(&mut dbfile, 0, &buffer));

        fs::remove_file(&path).unwrap();
    }
}
