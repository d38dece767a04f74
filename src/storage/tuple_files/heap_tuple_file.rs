//! This module contains utilities and classes for tuple files with a backing structure based
//! on a heap: tuples are stored in no particular order, in the first page that has room for
//! them.

use std::fs::File;

use super::super::{DBFile, PinError, Pinnable, Tuple, TupleError};
use super::super::dbpage::{self, EMPTY_SLOT};
use super::super::file_manager::{self, load_dbpage, save_page};
use super::super::page_tuple::{PageTuple, get_tuple_storage_size};
use ::expressions::Literal;
use ::relations::Schema;

/// A page tuple stored in a heap file, so it has an associated slot. Together with the page
/// number of the backing page, the slot forms the tuple's identity within the file.
pub struct HeapFilePageTuple {
    page_tuple: PageTuple,
    /// The slot at which the tuple is stored in the heap tuple file.
    pub slot: u16,
}

impl ::std::ops::Deref for HeapFilePageTuple {
    type Target = PageTuple;

    fn deref(&self) -> &Self::Target {
        &self.page_tuple
    }
}

impl Pinnable for HeapFilePageTuple {
    fn pin(&mut self) {
        self.page_tuple.pin()
    }

    fn unpin(&mut self) -> Result<(), PinError> {
        self.page_tuple.unpin()
    }

    fn get_pin_count(&self) -> u32 {
        self.page_tuple.get_pin_count()
    }
}

impl Tuple for HeapFilePageTuple {
    fn is_disk_backed(&self) -> bool {
        self.page_tuple.is_disk_backed()
    }

    fn is_null_value(&self, col_index: usize) -> Result<bool, TupleError> {
        self.page_tuple.is_null_value(col_index)
    }

    fn get_column_count(&self) -> usize {
        self.page_tuple.get_column_count()
    }

    fn get_column_value(&mut self, col_index: usize) -> Result<Literal, TupleError> {
        self.page_tuple.get_column_value(col_index)
    }
}

/// This class implements tuple file processing for heap files: schema persistence in the
/// header page, tuple insertion and deletion, and the slot-by-slot, page-by-page cursor that
/// plan nodes pull tuples from.
#[derive(Debug, PartialEq)]
pub struct HeapTupleFile {
    db_file: DBFile<File>,
    /// The schema of tuples in this tuple file.
    pub schema: Schema,
}

impl HeapTupleFile {
    /// Instantiates a new heap tuple file with a given `DBFile` and schema, persisting the
    /// schema into the file's header page.
    ///
    /// # Arguments
    /// * db_file - The backing `DBFile`.
    /// * schema - The schema that the file is based on.
    ///
    /// # Errors
    /// Fails when the schema cannot be written to the header page.
    pub fn new(db_file: DBFile<File>, schema: Schema) -> Result<HeapTupleFile, file_manager::Error> {
        let mut result = HeapTupleFile {
            db_file: db_file,
            schema: schema,
        };
        try!(result.save_metadata());
        Ok(result)
    }

    /// Opens a heap tuple file by reading the schema back out of a given `DBFile`'s header
    /// page.
    ///
    /// # Arguments
    /// * db_file - The backing `DBFile`.
    ///
    /// # Errors
    /// Fails when the header page cannot be read or does not hold a valid schema.
    pub fn open(mut db_file: DBFile<File>) -> Result<HeapTupleFile, file_manager::Error> {
        let mut header_page = try!(load_dbpage(&mut db_file, 0, false));

        let schema = try!(Schema::from_header_page(&mut header_page)
            .map_err(|_| file_manager::Error::IOError));
        try!(header_page.unpin());

        Ok(HeapTupleFile {
            db_file: db_file,
            schema: schema,
        })
    }

    /// The path of the backing file, when the file is backed by a real path.
    pub fn get_path(&self) -> Option<::std::path::PathBuf> {
        self.db_file.file_info.path.clone()
    }

    /// Writes the metadata of the tuple file (currently just the schema) into the header
    /// page on disk.
    pub fn save_metadata(&mut self) -> Result<(), file_manager::Error> {
        let mut header_page = try!(load_dbpage(&mut self.db_file, 0, false));

        try!(self.schema.write(&mut header_page).map_err(|_| file_manager::Error::IOError));

        try!(save_page(&mut self.db_file, 0, &header_page.page_data));
        header_page.set_dirty(false);
        try!(header_page.unpin());

        Ok(())
    }

    /// Adds the specified tuple into the table file, returning a new object corresponding to
    /// the actual tuple added to the table.
    ///
    /// The pages of the file are tried in order; a page that reports it has no room for the
    /// tuple is skipped, and if no existing page has room, a fresh page is appended at the
    /// end of the file.
    ///
    /// # Arguments
    /// * tuple - a tuple object containing the values to add to the table
    ///
    /// # Errors
    /// Fails when the tuple cannot fit in any page at all, or when reading or writing pages
    /// fails.
    pub fn add_tuple<T: Tuple + ?Sized>(&mut self,
                                        tuple: &mut T)
                                        -> Result<HeapFilePageTuple, TupleError> {
        let tuple_size = try!(get_tuple_storage_size(&self.schema, tuple));
        debug!("Adding new tuple of size {} bytes.", tuple_size);

        // The page must hold the slot count, at least one slot, and the tuple itself.
        if tuple_size as u32 + 4 > self.db_file.get_page_size() {
            return Err(TupleError::TupleTooBig(tuple_size, self.db_file.get_page_size()));
        }

        // Header page is page 0, so the first data page is page 1.
        let mut page_no = 1;
        let mut chosen = None;
        while chosen.is_none() {
            let page_result = load_dbpage(&mut self.db_file, page_no, false);
            let mut cur_page = match page_result {
                Ok(page) => page,
                Err(file_manager::Error::NotFullyRead) => {
                    // Reached the end of the data file without finding space for the tuple.
                    break;
                }
                Err(e) => {
                    return Err(e.into());
                }
            };

            match cur_page.alloc_new_tuple(tuple_size) {
                Ok(slot) => {
                    debug!("Found space for new tuple in page {}.", page_no);
                    chosen = Some((cur_page, slot));
                }
                Err(dbpage::Error::NotEnoughFreeSpace(needed, free)) => {
                    // This page can't hold the tuple; move on to the next data page.
                    trace!("Page {} has {} bytes free, but {} are needed.",
                           page_no,
                           free,
                           needed);
                    try!(cur_page.unpin());
                    page_no += 1;
                }
                Err(e) => {
                    return Err(e.into());
                }
            }
        }

        let (mut db_page, slot) = match chosen {
            Some(found) => found,
            None => {
                // Create a new page at the end of the file. At this point, page_no is *just
                // past* the last page in the data file.
                debug!("Creating new page {} to store new tuple.", page_no);
                let mut cur_page = try!(load_dbpage(&mut self.db_file, page_no, true));
                try!(cur_page.init_new_page());
                let slot = try!(cur_page.alloc_new_tuple(tuple_size));
                (cur_page, slot)
            }
        };

        let tuple_offset = try!(db_page.get_slot_value(slot));
        debug!("New tuple will reside on page {}, slot {}.", page_no, slot);

        try!(db_page.store_new_tuple(tuple_offset, &self.schema, tuple));
        try!(save_page(&mut self.db_file, page_no, &db_page.page_data));
        db_page.set_dirty(false);
        try!(db_page.unpin());

        let mut page_tuple = try!(PageTuple::new(db_page, tuple_offset, self.schema.clone()));
        page_tuple.pin();

        Ok(HeapFilePageTuple {
            page_tuple: page_tuple,
            slot: slot,
        })
    }

    /// Returns the first tuple in this table file, or `None` if there are no tuples in the
    /// file.
    pub fn get_first_tuple(&mut self) -> Result<Option<HeapFilePageTuple>, file_manager::Error> {
        // Scan through the data pages until we hit the end of the table file. It may be that
        // the first run of data pages is empty, so just keep looking until we hit the end of
        // the file.

        // Header page is page 0, so first data page is page 1.
        let mut page_no = 1;
        loop {
            let mut db_page = match load_dbpage(&mut self.db_file, page_no, false) {
                Ok(page) => page,
                Err(file_manager::Error::NotFullyRead) => break,
                Err(e) => {
                    return Err(e);
                }
            };

            let num_slots = try!(db_page.get_num_slots());
            let mut first_slot = None;
            for slot in 0..num_slots {
                let offset = try!(db_page.get_slot_value(slot));
                if offset != EMPTY_SLOT {
                    first_slot = Some((slot, offset));
                    break;
                }
            }

            match first_slot {
                Some((slot, offset)) => {
                    // This is the first tuple in the file. Build up the HeapFilePageTuple
                    // object and return it. The pin taken by the page load is handed over to
                    // the tuple.
                    try!(db_page.unpin());
                    let mut tuple = try!(PageTuple::new(db_page, offset, self.schema.clone())
                        .map_err(|_| file_manager::Error::IOError));
                    tuple.pin();
                    return Ok(Some(HeapFilePageTuple {
                        page_tuple: tuple,
                        slot: slot,
                    }));
                }
                None => {
                    try!(db_page.unpin());
                    page_no += 1;
                }
            }
        }

        Ok(None)
    }

    /// Returns the tuple that follows the specified tuple, or `None` if there are no more
    /// tuples in the file. This method must operate correctly regardless of whether the input
    /// tuple is pinned or unpinned.
    ///
    /// # Arguments
    /// * cur_tuple - the tuple to advance past.
    pub fn get_next_tuple(&mut self,
                          cur_tuple: &HeapFilePageTuple)
                          -> Result<Option<HeapFilePageTuple>, file_manager::Error> {
        /* Procedure:
         *   1)  Get slot index of current tuple.
         *   2)  If there are more slots in the current page, find the next non-empty slot.
         *   3)  If we get to the end of this page, go to the next page and try again.
         *   4)  If we get to the end of the file, we return None.
         */
        let prev_page_no = cur_tuple.get_page_no();
        let prev_slot = cur_tuple.slot;

        let mut db_page = try!(load_dbpage(&mut self.db_file, prev_page_no, false));

        // Start by looking at the slot immediately following the previous tuple's slot.
        let mut next_slot = prev_slot + 1;

        loop {
            let num_slots = try!(db_page.get_num_slots());

            let mut found = None;
            while next_slot < num_slots {
                let next_offset = try!(db_page.get_slot_value(next_slot));
                if next_offset != EMPTY_SLOT {
                    found = Some((next_slot, next_offset));
                    break;
                }
                next_slot += 1;
            }

            if let Some((slot, offset)) = found {
                try!(db_page.unpin());
                let mut tuple = try!(PageTuple::new(db_page, offset, self.schema.clone())
                    .map_err(|_| file_manager::Error::IOError));
                tuple.pin();
                return Ok(Some(HeapFilePageTuple {
                    page_tuple: tuple,
                    slot: slot,
                }));
            }

            // If we got here then we reached the end of this page with no tuples. Go on to
            // the next data-page, and start with the first tuple in that page.
            let next_page_no = db_page.page_no + 1;
            try!(db_page.unpin());
            match load_dbpage(&mut self.db_file, next_page_no, false) {
                Ok(page) => {
                    db_page = page;
                    next_slot = 0;
                }
                Err(file_manager::Error::NotFullyRead) => break,
                Err(e) => {
                    return Err(e);
                }
            }
        }

        Ok(None)
    }

    /// Re-fetches the tuple stored at the specified (page, slot) position. This is how
    /// consumers that remembered a tuple's identity (e.g. a marked scan position) get the
    /// tuple back.
    ///
    /// # Arguments
    /// * page_no - the page the tuple lives in.
    /// * slot - the tuple's slot within that page.
    ///
    /// # Errors
    /// Fails when the page does not exist, when the slot index is out of range, or when the
    /// slot is empty.
    pub fn get_tuple_at(&mut self,
                        page_no: u32,
                        slot: u16)
                        -> Result<HeapFilePageTuple, file_manager::Error> {
        let mut db_page = try!(load_dbpage(&mut self.db_file, page_no, false));

        let offset = match db_page.get_slot_value(slot) {
            Ok(offset) => offset,
            Err(e) => {
                try!(db_page.unpin());
                return Err(e.into());
            }
        };
        if offset == EMPTY_SLOT {
            try!(db_page.unpin());
            return Err(dbpage::Error::EmptySlot(slot).into());
        }

        try!(db_page.unpin());
        let mut tuple = try!(PageTuple::new(db_page, offset, self.schema.clone())
            .map_err(|_| file_manager::Error::IOError));
        tuple.pin();
        Ok(HeapFilePageTuple {
            page_tuple: tuple,
            slot: slot,
        })
    }

    /// Deletes the tuple at the specified (page, slot) position from the file, saving the
    /// compacted page back to disk.
    ///
    /// # Arguments
    /// * page_no - the page the tuple lives in.
    /// * slot - the tuple's slot within that page.
    ///
    /// # Errors
    /// Fails when the page does not exist, when the slot index is out of range, or when the
    /// slot is already empty.
    pub fn delete_tuple(&mut self, page_no: u32, slot: u16) -> Result<(), file_manager::Error> {
        let mut db_page = try!(load_dbpage(&mut self.db_file, page_no, false));

        match db_page.delete_tuple(slot) {
            Ok(()) => {}
            Err(e) => {
                try!(db_page.unpin());
                return Err(e.into());
            }
        }

        try!(save_page(&mut self.db_file, page_no, &db_page.page_data));
        db_page.set_dirty(false);
        db_page.unpin().map_err(Into::into)
    }

    /// Walks the data pages of the file, counting pages and live tuples. Used by scan nodes
    /// to derive plan cost estimates.
    pub fn count_pages_and_tuples(&mut self) -> Result<(u32, u32), file_manager::Error> {
        let mut num_pages = 0;
        let mut num_tuples = 0;

        let mut page_no = 1;
        loop {
            let mut db_page = match load_dbpage(&mut self.db_file, page_no, false) {
                Ok(page) => page,
                Err(file_manager::Error::NotFullyRead) => break,
                Err(e) => {
                    return Err(e);
                }
            };

            num_pages += 1;
            let num_slots = try!(db_page.get_num_slots());
            for slot in 0..num_slots {
                if try!(db_page.get_slot_value(slot)) != EMPTY_SLOT {
                    num_tuples += 1;
                }
            }

            try!(db_page.unpin());
            page_no += 1;
        }

        Ok((num_pages, num_tuples))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempdir::TempDir;

    use super::*;
    use ::expressions::Literal;
    use ::relations::{ColumnInfo, ColumnType, Schema};
    use ::storage::{Tuple, TupleLiteral};
    use ::storage::dbfile::DBFileType;
    use ::storage::file_manager::{create_dbfile, open_dbfile};

    lazy_static! {
        static ref DIR: TempDir = {
            if let Ok(dir) = TempDir::new("test_heap_files") {
                dir
            } else {
                panic!("Unable to create test_heap_files directory!");
            }
        };
    }

    fn temp_path(name: &str) -> PathBuf {
        DIR.path().join(name)
    }

    fn two_int_schema() -> Schema {
        Schema::with_columns(vec![
            ColumnInfo::with_table_name(ColumnType::Integer, "A", "T"),
            ColumnInfo::with_table_name(ColumnType::Integer, "B", "T"),
        ])
            .unwrap()
    }

    fn row(a: i32, b: i32) -> TupleLiteral {
        TupleLiteral::from_iter(vec![Literal::Int(a), Literal::Int(b)])
    }

    fn collect_values(heap_file: &mut HeapTupleFile) -> Vec<TupleLiteral> {
        let mut result = Vec::new();
        let mut cur = heap_file.get_first_tuple().unwrap();
        while let Some(mut tuple) = cur {
            result.push(TupleLiteral::from_tuple(&mut tuple));
            tuple.unpin().unwrap();
            cur = heap_file.get_next_tuple(&tuple).unwrap();
        }
        result
    }

    #[test]
    fn test_schema_round_trip() {
        let path = temp_path("schema_round_trip.tbl");
        let schema = two_int_schema();

        {
            let db_file = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();
            HeapTupleFile::new(db_file, schema.clone()).unwrap();
        }

        let db_file = open_dbfile(&path).unwrap();
        let heap_file = HeapTupleFile::open(db_file).unwrap();
        assert_eq!(schema, heap_file.schema);
    }

    #[test]
    fn test_add_and_scan() {
        let path = temp_path("add_and_scan.tbl");
        let db_file = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();
        let mut heap_file = HeapTupleFile::new(db_file, two_int_schema()).unwrap();

        assert!(heap_file.get_first_tuple().unwrap().is_none());

        for i in 0..3 {
            let mut tuple = row(i, i * 10);
            let mut stored = heap_file.add_tuple(&mut tuple).unwrap();
            assert_eq!(Ok(Literal::Int(i)), stored.get_column_value(0));
            stored.unpin().unwrap();
        }

        assert_eq!(vec![row(0, 0), row(1, 10), row(2, 20)],
                   collect_values(&mut heap_file));
    }

    #[test]
    fn test_multi_page_scan() {
        let path = temp_path("multi_page.tbl");
        let db_file = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();
        let mut heap_file = HeapTupleFile::new(db_file, two_int_schema()).unwrap();

        // Each tuple occupies 9 bytes of data plus a 2-byte slot, so a 512-byte page holds
        // 46 of them; 100 tuples spread over three data pages.
        for i in 0..100 {
            let mut stored = heap_file.add_tuple(&mut row(i, -i)).unwrap();
            stored.unpin().unwrap();
        }

        let values = collect_values(&mut heap_file);
        assert_eq!(100, values.len());
        let expected: Vec<TupleLiteral> = (0..100).map(|i| row(i, -i)).collect();
        assert_eq!(expected, values);

        assert_eq!((3, 100), heap_file.count_pages_and_tuples().unwrap());
    }

    #[test]
    fn test_get_tuple_at() {
        let path = temp_path("tuple_at.tbl");
        let db_file = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();
        let mut heap_file = HeapTupleFile::new(db_file, two_int_schema()).unwrap();

        let (page_no, slot) = {
            let mut stored = heap_file.add_tuple(&mut row(5, 6)).unwrap();
            stored.unpin().unwrap();
            (stored.get_page_no(), stored.slot)
        };

        let mut refetched = heap_file.get_tuple_at(page_no, slot).unwrap();
        assert_eq!(Ok(Literal::Int(5)), refetched.get_column_value(0));
        assert_eq!(Ok(Literal::Int(6)), refetched.get_column_value(1));
        refetched.unpin().unwrap();

        // Out-of-range slot and missing page both fail.
        assert!(heap_file.get_tuple_at(page_no, 99).is_err());
        assert!(heap_file.get_tuple_at(17, 0).is_err());
    }

    #[test]
    fn test_delete_tuple() {
        let path = temp_path("delete_tuple.tbl");
        let db_file = create_dbfile(&path, DBFileType::HeapTupleFile, 512).unwrap();
        let mut heap_file = HeapTupleFile::new(db_file, two_int_schema()).unwrap();

        let mut positions = Vec::new();
        for i in 0..3 {
            let mut stored = heap_file.add_tuple(&mut row(i, i)).unwrap();
            stored.unpin().unwrap();
            positions.push((stored.get_page_no(), stored.slot));
        }

        let (page_no, slot) = positions[1];
        heap_file.delete_tuple(page_no, slot).unwrap();

        assert_eq!(vec![row(0, 0), row(2, 2)], collect_values(&mut heap_file));

        // The position is gone; deleting it again is an error.
        assert!(heap_file.delete_tuple(page_no, slot).is_err());
        assert!(heap_file.get_tuple_at(page_no, slot).is_err());
    }
}
