//! This module contains utilities to handle pages within database files, including the
//! slotted-page layout that tuple pages use.
//!
//! # Slotted-page layout
//!
//! A tuple data page is laid out with a slot directory growing from the low end of the page
//! and a tuple heap packed downward from the high end:
//!
//! ```text
//! byte 0..1     : number of slots (unsigned 16-bit)
//! byte 2..2N+1  : N slot entries, each the 16-bit offset of that slot's tuple
//!                 within the same page, or EMPTY_SLOT for an empty slot
//! ...free space...
//! high end      : tuple bodies, packed downward; earlier slots hold higher
//!                 offsets than later slots among the non-empty slots
//! ```
//!
//! The layout maintains these invariants across every mutating operation:
//!
//! - Non-empty slots are ordered by offset: of two non-empty slots, the lower-indexed one
//!   refers to the higher offset.
//! - Tuple bodies are contiguous from the tuple-data start to the end of the page, with no
//!   interior gaps.
//! - The last slot in the directory is never empty; trailing empty slots are trimmed when
//!   tuples are deleted.
//!
//! Tuple lengths are never stored; the length of a tuple is derived from the offset of the
//! nearest non-empty slot at a lower index (or the page size, for the first live tuple).

use std::error::Error as ErrorTrait;
use std::io::{self, ErrorKind, SeekFrom};
use std::io::prelude::*;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use ::expressions::Literal;
use ::relations::{ColumnType, Schema};
use ::storage::{DBFileInfo, PinError, Pinnable, Tuple, TupleError, WriteMiniDBExt};
use ::storage::page_tuple::get_null_flags_size;

/// The offset in the data page where the number of slots in the slot table is stored.
const OFFSET_NUM_SLOTS: u16 = 0;

/// This offset-value is stored into a slot when it is empty. It is set to zero because this is
/// where the page's slot-count is stored and therefore this is obviously an invalid offset for
/// a tuple to be located at.
pub const EMPTY_SLOT: u16 = 0;

#[derive(Debug, Clone, PartialEq)]
/// An error that can occur during the operations on a `DBPage`.
pub enum Error {
    /// Some I/O error occurred.
    IOError(String),
    /// For when a tuple error occurs.
    TupleError(Box<TupleError>),
    /// The slot asked for is at an invalid position. In the form of (num slots, slot desired).
    InvalidSlot(u16, u16),
    /// The slot asked for is empty, but the operation requires a live tuple.
    EmptySlot(u16),
    /// The page does not have enough space for the tuple. In the form of (needed, free space).
    NotEnoughFreeSpace(u16, u16),
    /// The provided offset is not in the tuple data portion of the page. In the form of
    /// (offset, tuple data start).
    OffsetNotInTuplePortion(u16, u16),
    /// The provided range extends past the end of the page. In the form of (length, bytes
    /// available at the offset).
    RangeTooLarge(u16, u16),
    /// The tuple provided does not have the same arity as the schema provided. In the form of
    /// (tuple size, schema size).
    WrongArity(usize, usize),
}

impl ::std::fmt::Display for Error {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            Error::IOError(ref e) => {
                write!(f, "An IO error occurred: {}", e)
            }
            Error::TupleError(ref e) => write!(f, "{}", e),
            Error::InvalidSlot(num_slots, slot) => {
                write!(f, "Valid slots are in range [0, {}). Got {}.", num_slots, slot)
            }
            Error::EmptySlot(slot) => {
                write!(f, "Slot {} is empty.", slot)
            }
            Error::NotEnoughFreeSpace(needed, free) => {
                write!(f,
                       "Requested {} bytes, but not enough free space in the page ({} bytes).",
                       needed,
                       free)
            }
            Error::OffsetNotInTuplePortion(offset, tuple_data_start) => {
                write!(f,
                       "Specified offset {} is not actually in the tuple data portion of this \
                        page (data starts at offset {}).",
                       offset,
                       tuple_data_start)
            }
            Error::RangeTooLarge(length, available) => {
                write!(f,
                       "Specified tuple range of {} bytes is larger than the {} bytes available \
                        at that offset.",
                       length,
                       available)
            }
            Error::WrongArity(tup_size, schema_size) => {
                write!(f,
                       "Tuple has different arity ({} columns) than target schema ({} columns).",
                       tup_size,
                       schema_size)
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::IOError(e.description().into())
    }
}

impl From<TupleError> for Error {
    fn from(error: TupleError) -> Error {
        Error::TupleError(Box::new(error))
    }
}

#[inline]
fn get_slot_offset(slot: u16) -> u16 {
    (1 + slot) * 2
}

/// This class represents a single page in a database file. The page's (zero-based) index in
/// the file, and whether the page has been changed in memory, are tracked by the object.
///
/// Database pages do not provide any locking mechanisms to guard against concurrent access.
/// Locking must be managed at a level above what this class provides.
///
/// The class provides methods to read and write a range of primitive types. Multibyte values
/// are stored in big-endian format, with the most significant byte (MSB) stored at the lowest
/// index, and the least significant byte (LSB) stored at the highest index. (This is also the
/// network byte order specified by the Internet Protocol.)
///
/// # Design
/// It is very important that the page is marked dirty *before* any changes are made, because
/// this is the point when the old version of the page data is copied before changes are made.
/// Additionally, the page's data must not be manipulated separately from the methods provided
/// by this class, or else the old version of the page won't be recorded properly.
pub struct DBPage {
    /// The page number of the `DBPage`.
    pub page_no: u32,
    pin_count: u32,
    dirty: bool,
    /// The data contained in the page.
    pub page_data: Vec<u8>,
    old_page_data: Option<Vec<u8>>,

    cur_page_position: u64,
}

impl DBPage {
    /// Instantiate a new `DBPage` instance, referring to a page number on a `DBFile` with the
    /// provided information. The page buffer starts out zero-filled.
    ///
    /// # Arguments
    /// * db_file_info - The `DBFile` metadata.
    /// * page_no - The page number.
    pub fn new(db_file_info: &DBFileInfo, page_no: u32) -> Result<DBPage, Error> {
        let page = DBPage {
            page_no: page_no,
            pin_count: 0,
            dirty: false,
            page_data: vec![0; db_file_info.page_size as usize],
            old_page_data: None,
            cur_page_position: 0,
        };
        Ok(page)
    }

    /// Sets the dirty flag to true or false, indicating whether the page's data has or has not
    /// been changed in memory.
    ///
    /// # Arguments
    /// * is_dirty - the dirty flag; true if the page's data is dirty, or false otherwise
    pub fn set_dirty(&mut self, is_dirty: bool) {
        if !self.dirty && is_dirty {
            self.old_page_data = Some(self.page_data.clone());
        } else if self.dirty && !is_dirty {
            self.old_page_data = None;
        }

        self.dirty = is_dirty;
    }

    /// Whether the page has been changed in memory since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Given a position within the page, read enough data to fill the provided buffer.
    ///
    /// # Arguments
    /// * position - The byte at which to start reading.
    /// * buffer - The buffer being read into.
    ///
    /// # Errors
    /// An error can occur if the read would run past the end of the page.
    pub fn read_at_position(&self, position: usize, buffer: &mut [u8]) -> Result<usize, ()> {
        let length = buffer.len();
        if position + length > self.page_data.len() {
            return Err(());
        }
        buffer.copy_from_slice(&self.page_data[position..(position + length)]);
        Ok(length)
    }

    /// Given a position within the page, write data from the provided buffer into the page
    /// data.
    ///
    /// # Arguments
    /// * position - The byte at which to start writing.
    /// * buffer - The buffer being written from.
    ///
    /// # Errors
    /// An error can occur if the write would run past the end of the page.
    pub fn write_at_position(&mut self, position: usize, buffer: &[u8]) -> Result<usize, ()> {
        let length = buffer.len();
        if position + length > self.page_data.len() {
            return Err(());
        }
        self.set_dirty(true);
        self.page_data[position..(position + length)].copy_from_slice(buffer);
        Ok(length)
    }

    /// Initialize a newly allocated data page. Currently this involves setting the number of
    /// slots to 0. There is no other internal structure in data pages at this point.
    #[inline]
    pub fn init_new_page(&mut self) -> Result<(), Error> {
        self.set_num_slots(0)
    }

    fn set_num_slots(&mut self, num_slots: u16) -> Result<(), Error> {
        try!(self.seek(SeekFrom::Start(OFFSET_NUM_SLOTS as u64)));
        self.write_u16::<BigEndian>(num_slots).map_err(Into::into)
    }

    /// Returns the number of slots in this data page. This can be considered to be the current
    /// "capacity" of the page, since any number of the slots could be set to
    /// [`EMPTY_SLOT`](constant.EMPTY_SLOT.html) to indicate that they are empty.
    pub fn get_num_slots(&mut self) -> Result<u16, Error> {
        try!(self.seek(SeekFrom::Start(OFFSET_NUM_SLOTS as u64)));
        self.read_u16::<BigEndian>().map_err(Into::into)
    }

    /// This helper function returns the value stored in the specified slot. This will either
    /// be the offset of the start of a tuple in the data page, or it will be
    /// [`EMPTY_SLOT`](constant.EMPTY_SLOT.html) if the slot is empty.
    ///
    /// # Arguments
    /// * slot - the slot to retrieve the value for.
    ///
    /// # Errors
    /// Returns an `InvalidSlot` error if the slot provided is not within the range
    /// [0, num_slots).
    pub fn get_slot_value(&mut self, slot: u16) -> Result<u16, Error> {
        let num_slots = try!(self.get_num_slots());

        if slot >= num_slots {
            return Err(Error::InvalidSlot(num_slots, slot));
        }

        try!(self.seek(SeekFrom::Start(get_slot_offset(slot) as u64)));
        self.read_u16::<BigEndian>().map_err(Into::into)
    }

    fn set_slot_value(&mut self, slot: u16, value: u16) -> Result<(), Error> {
        let num_slots = try!(self.get_num_slots());

        if slot >= num_slots {
            return Err(Error::InvalidSlot(num_slots, slot));
        }

        try!(self.seek(SeekFrom::Start(get_slot_offset(slot) as u64)));
        self.write_u16::<BigEndian>(value).map_err(Into::into)
    }

    fn get_slots_end_index(&mut self) -> Result<u16, Error> {
        self.get_num_slots().map(|num_slots| get_slot_offset(num_slots))
    }

    /// Returns the offset of the first byte of tuple data in the page: the smallest offset
    /// among the non-empty slots, or the page size if the page holds no tuples.
    pub fn get_tuple_data_start(&mut self) -> Result<u16, Error> {
        let num_slots = try!(self.get_num_slots());
        // If there are no tuples in this page, "data start" is the top of the page data.
        let mut data_start = self.page_data.len() as u16;

        if num_slots > 0 {
            let mut slot = num_slots - 1;
            loop {
                let slot_value = try!(self.get_slot_value(slot));
                if slot_value != EMPTY_SLOT {
                    data_start = slot_value;
                    break;
                }

                if slot == 0 {
                    break;
                }

                slot -= 1;
            }
        }

        Ok(data_start)
    }

    /// Returns the length of the tuple stored at the specified slot. The length is not stored
    /// anywhere in the page; it is derived from the offset of the nearest non-empty slot at a
    /// lower index, or from the page size if the slot holds the first live tuple.
    ///
    /// # Arguments
    /// * slot - the slot of the tuple to compute the length of.
    ///
    /// # Errors
    /// Returns an `InvalidSlot` error if the slot is not within [0, num_slots), and an
    /// `EmptySlot` error if the slot holds no tuple.
    pub fn get_tuple_length(&mut self, slot: u16) -> Result<u16, Error> {
        let num_slots = try!(self.get_num_slots());

        if slot >= num_slots {
            return Err(Error::InvalidSlot(num_slots, slot));
        }

        let offset = try!(self.get_slot_value(slot));
        if offset == EMPTY_SLOT {
            return Err(Error::EmptySlot(slot));
        }

        // Walk towards lower slot indexes for the nearest non-empty predecessor; its tuple is
        // stored immediately above this one in the page.
        let mut prev_end = self.page_data.len() as u16;
        let mut prev = slot;
        while prev > 0 {
            prev -= 1;

            let prev_value = try!(self.get_slot_value(prev));
            if prev_value != EMPTY_SLOT {
                prev_end = prev_value;
                break;
            }
        }

        Ok(prev_end - offset)
    }

    /// This helper function returns the amount of free space in a tuple data page. It simply
    /// uses other methods in this class to perform the simple computation.
    #[inline]
    pub fn get_free_space(&mut self) -> Result<u16, Error> {
        let data_start = try!(self.get_tuple_data_start());
        let slot_end = try!(self.get_slots_end_index());
        Ok(data_start - slot_end)
    }

    /// Update the data page so that it has space for a new tuple of the specified size. The
    /// new tuple is assigned a slot (whose index is returned by this method), and the space
    /// for the tuple is initialized to all zero values.
    ///
    /// Returns the slot-index for the new tuple. The offset to the start of the requested
    /// space is available via that slot. (Use `get_slot_value` to retrieve that offset.)
    ///
    /// # Arguments
    /// * len - The length of the new tuple's data.
    ///
    /// # Errors
    /// Returns a `NotEnoughFreeSpace` error if the page cannot hold the new tuple. The caller
    /// reacts by placing the tuple in a different page; the layout is untouched in that case.
    pub fn alloc_new_tuple(&mut self, len: u16) -> Result<u16, Error> {
        let mut space_needed = len;

        debug!("Allocating space for new {}-byte tuple.", len);

        let mut num_slots = try!(self.get_num_slots());
        debug!("Current number of slots on page: {}", num_slots);

        // This variable tracks where the new tuple should END. It starts as the page-size, and
        // gets moved down past each valid tuple in the page, until we find an available slot
        // in the page.
        let mut new_tuple_end = self.page_data.len() as u16;

        let mut slot = 0;
        while slot < num_slots {
            // cur_slot_value is either the start of that slot's tuple-data, or it is set to
            // EMPTY_SLOT.
            let cur_slot_value = try!(self.get_slot_value(slot));
            if cur_slot_value == EMPTY_SLOT {
                break;
            } else {
                new_tuple_end = cur_slot_value;
            }
            slot += 1;
        }

        // The scan stopped at the first empty slot, without looking at the slots past it.
        // That is sound because non-empty slots are ordered by offset: every non-empty slot
        // after the chosen one already sits below new_tuple_end in the page.
        debug_assert!({
            let mut ordered = true;
            for later in slot..num_slots {
                let value = self.get_slot_value(later).unwrap_or(EMPTY_SLOT);
                if value != EMPTY_SLOT && value >= new_tuple_end {
                    ordered = false;
                }
            }
            ordered
        });

        // First make sure we actually have enough space for the new tuple.

        if slot == num_slots {
            // We'll need to add a new slot to the list. Make sure there's room.
            space_needed += 2;
        }

        let free_space = try!(self.get_free_space());
        if space_needed > free_space {
            return Err(Error::NotEnoughFreeSpace(space_needed, free_space));
        }

        // Now we know we have space for the tuple. Update the slot list, and update the
        // page's layout to make room for the new tuple.
        if slot == num_slots {
            debug!("No empty slot available. Adding a new slot.");

            // Add the new slot to the page, and update the total number of slots.
            num_slots += 1;
            try!(self.set_num_slots(num_slots));
            try!(self.set_slot_value(slot, EMPTY_SLOT));
        }

        debug!("Tuple will get slot {}. Final number of slots: {}", slot, num_slots);

        let new_tuple_start = new_tuple_end - len;

        debug!("New tuple of {} bytes will reside at location [{}, {}).",
               len,
               new_tuple_start,
               new_tuple_end);

        // Make room for the new tuple's data to be stored into. Since tuples are stored from
        // the END of the page going backwards, we specify the new tuple's END index, and the
        // tuple's length. (Note: This call also updates all affected slots whose offsets
        // would be changed.)
        try!(self.insert_tuple_data_range(new_tuple_end, len));

        // Set the slot's value to be the starting offset of the tuple. We have to do this
        // *after* we insert the new space for the new tuple, or else insert_tuple_data_range()
        // will clobber the slot-value of this tuple.
        try!(self.set_slot_value(slot, new_tuple_start));

        // The allocation must leave the directory without a trailing empty slot: either an
        // interior empty slot was reused, or the slot just appended was filled.
        debug_assert!(self.get_slot_value(num_slots - 1).unwrap_or(EMPTY_SLOT) != EMPTY_SLOT);

        // Finally, return the slot-index of the new tuple.
        Ok(slot)
    }

    /// Deletes the tuple at the specified slot from the data page. The tuple's space is
    /// reclaimed by sliding lower tuples up in the page, the slot is set to
    /// [`EMPTY_SLOT`](constant.EMPTY_SLOT.html), and any empty slots left at the end of the
    /// slot directory are trimmed off.
    ///
    /// # Arguments
    /// * slot - the slot of the tuple to delete.
    ///
    /// # Errors
    /// Returns an `InvalidSlot` error if the slot is not within [0, num_slots), and an
    /// `EmptySlot` error if the slot holds no tuple.
    pub fn delete_tuple(&mut self, slot: u16) -> Result<(), Error> {
        debug!("Deleting tuple at slot {}.", slot);

        let num_slots = try!(self.get_num_slots());
        if slot >= num_slots {
            return Err(Error::InvalidSlot(num_slots, slot));
        }

        let offset = try!(self.get_slot_value(slot));
        if offset == EMPTY_SLOT {
            return Err(Error::EmptySlot(slot));
        }

        let length = try!(self.get_tuple_length(slot));
        debug!("Tuple occupies range [{}, {}).", offset, offset + length);

        // Reclaim the tuple's space. This moves the victim's own slot value as well; the slot
        // is cleared right afterwards.
        try!(self.delete_tuple_data_range(offset, length));
        try!(self.set_slot_value(slot, EMPTY_SLOT));

        // Trim trailing empty slots off of the directory, so the last slot is always live.
        let mut num_slots = try!(self.get_num_slots());
        while num_slots > 0 {
            let last_value = try!(self.get_slot_value(num_slots - 1));
            if last_value != EMPTY_SLOT {
                break;
            }
            num_slots -= 1;
        }
        try!(self.set_num_slots(num_slots));

        Ok(())
    }

    fn move_data_range(&mut self, src_pos: usize, dest_pos: usize, length: usize) {
        self.set_dirty(true);

        let src_data = self.page_data[src_pos..(src_pos + length)].to_vec();
        self.page_data[dest_pos..(dest_pos + length)].copy_from_slice(&src_data);
    }

    fn set_data_range(&mut self, position: usize, length: usize, value: u8) {
        self.set_dirty(true);
        for i in 0..length {
            self.page_data[position + i] = value;
        }
    }

    /// Opens a gap of `len` bytes ending at `offset` in the tuple-data region, by sliding the
    /// tuple data in [tuple_data_start, offset) down by `len` bytes. The created gap is
    /// zeroed, and every slot whose offset is strictly less than `offset` is updated to its
    /// new position.
    ///
    /// # Arguments
    /// * offset - the offset at which the created gap should end.
    /// * len - the size of the gap to create.
    ///
    /// # Errors
    /// Returns an `OffsetNotInTuplePortion` error if the offset lies below the tuple data in
    /// the page, and a `NotEnoughFreeSpace` error if the gap is larger than the page's free
    /// space.
    pub fn insert_tuple_data_range(&mut self, offset: u16, len: u16) -> Result<(), Error> {
        let tuple_data_start = try!(self.get_tuple_data_start());

        if offset < tuple_data_start {
            return Err(Error::OffsetNotInTuplePortion(offset, tuple_data_start));
        }
        if offset > self.page_data.len() as u16 {
            return Err(Error::RangeTooLarge(len, 0));
        }

        let free_space = try!(self.get_free_space());
        if len > free_space {
            return Err(Error::NotEnoughFreeSpace(len, free_space));
        }

        // If off == tuple_data_start then there's no need to move anything.
        if offset > tuple_data_start {
            // Move the data in the range [tuple_data_start, offset) to
            // [tuple_data_start - len, offset - len). Thus there will be a gap in the range
            // [offset - len, offset) after the operation is completed.
            self.move_data_range(tuple_data_start as usize,
                                 (tuple_data_start - len) as usize,
                                 (offset - tuple_data_start) as usize);
        }

        // Zero out the gap that was just created.
        let start_offset = offset - len;
        self.set_data_range(start_offset as usize, len as usize, 0);

        // Update affected slots; this includes all slots below the specified offset. The
        // update is easy; slot values just move down by len bytes.
        let num_slots = try!(self.get_num_slots());
        for slot in 0..num_slots {
            let slot_value = try!(self.get_slot_value(slot));
            if slot_value != EMPTY_SLOT && slot_value < offset {
                // Update this slot's offset.
                try!(self.set_slot_value(slot, slot_value - len));
            }
        }

        Ok(())
    }

    /// Closes the gap of `len` bytes starting at `offset` in the tuple-data region, by sliding
    /// the tuple data in [tuple_data_start, offset) up by `len` bytes. The vacated space at
    /// the start of the tuple-data region is zeroed, and every slot whose offset is less than
    /// or equal to `offset` is updated to its new position. (Note the "or equal": the slot
    /// owning the deleted range is moved too, and the caller clears it afterwards.)
    ///
    /// # Arguments
    /// * offset - the offset of the start of the range to reclaim.
    /// * len - the size of the range to reclaim.
    ///
    /// # Errors
    /// Returns an `OffsetNotInTuplePortion` error if the offset lies below the tuple data in
    /// the page, and a `RangeTooLarge` error if the range extends past the end of the page.
    pub fn delete_tuple_data_range(&mut self, offset: u16, len: u16) -> Result<(), Error> {
        let tuple_data_start = try!(self.get_tuple_data_start());
        let page_size = self.page_data.len() as u16;

        if offset < tuple_data_start {
            return Err(Error::OffsetNotInTuplePortion(offset, tuple_data_start));
        }
        if len > page_size - offset {
            return Err(Error::RangeTooLarge(len, page_size - offset));
        }

        // Slide the data in [tuple_data_start, offset) up to
        // [tuple_data_start + len, offset + len).
        if offset > tuple_data_start {
            self.move_data_range(tuple_data_start as usize,
                                 (tuple_data_start + len) as usize,
                                 (offset - tuple_data_start) as usize);
        }

        // Zero out the vacated space at the top of the tuple-data region.
        self.set_data_range(tuple_data_start as usize, len as usize, 0);

        // Update affected slots; all slots at or below the specified offset move up by len
        // bytes.
        let num_slots = try!(self.get_num_slots());
        for slot in 0..num_slots {
            let slot_value = try!(self.get_slot_value(slot));
            if slot_value != EMPTY_SLOT && slot_value <= offset {
                try!(self.set_slot_value(slot, slot_value + len));
            }
        }

        Ok(())
    }

    /// This is a helper function to set or clear the value of a column's `NULL` flag.
    ///
    /// # Arguments
    /// * tuple_start - the byte-offset in the page where the tuple starts
    /// * col_index - the index of the column to set the null-flag for
    /// * value - the new value for the null-flag
    pub fn set_null_flag(&mut self,
                         tuple_start: u16,
                         col_index: usize,
                         value: bool)
                         -> Result<(), Error> {
        // Skip to the byte that contains the NULL-flag for this specific column.
        let null_flag_offset = tuple_start + (col_index as u16 / 8);

        // Create a bit-mask for setting or clearing the specified NULL flag, then set/clear
        // the flag in the mask byte.
        let mask = 1 << (col_index % 8);

        try!(self.seek(SeekFrom::Start(null_flag_offset as u64)));
        let mut null_flag = try!(self.read_u8());

        null_flag = if value {
            null_flag | mask
        } else {
            null_flag & !mask
        };

        try!(self.seek(SeekFrom::Start(null_flag_offset as u64)));
        self.write_u8(null_flag).map_err(Into::into)
    }

    fn write_non_null_value(&mut self,
                            offset: u16,
                            col_type: ColumnType,
                            value: Literal)
                            -> Result<u16, Error> {
        try!(self.seek(SeekFrom::Start(offset as u64)));

        // We use unwraps here because we shouldn't be able to get to this point without the
        // value being storeable with that column type.
        match col_type {
            ColumnType::TinyInt => {
                let value = match value.as_int().unwrap() {
                    Literal::Int(i) => i,
                    _ => 0,
                } as i8;
                try!(self.write_i8(value));
                Ok(1)
            }
            ColumnType::SmallInt => {
                let value = match value.as_int().unwrap() {
                    Literal::Int(i) => i,
                    _ => 0,
                } as i16;
                try!(self.write_i16::<BigEndian>(value));
                Ok(2)
            }
            ColumnType::Integer => {
                let value = match value.as_int().unwrap() {
                    Literal::Int(i) => i,
                    _ => 0,
                };
                try!(self.write_i32::<BigEndian>(value));
                Ok(4)
            }
            ColumnType::BigInt => {
                let value = match value.as_long().unwrap() {
                    Literal::Long(l) => l,
                    _ => 0,
                };
                try!(self.write_i64::<BigEndian>(value));
                Ok(8)
            }
            ColumnType::Float => {
                let value = match value.as_float().unwrap() {
                    Literal::Float(f) => f,
                    _ => 0.0,
                };
                try!(self.write_f32::<BigEndian>(value));
                Ok(4)
            }
            ColumnType::Double => {
                let value = match value.as_double().unwrap() {
                    Literal::Double(d) => d,
                    _ => 0.0,
                };
                try!(self.write_f64::<BigEndian>(value));
                Ok(8)
            }
            ColumnType::Char { length } => {
                let value = value.as_string().unwrap();
                try!(self.write_fixed_size_string(value, length));
                Ok(length)
            }
            ColumnType::VarChar { length: _ } => {
                let value = value.as_string().unwrap();
                let str_len = value.len();
                try!(self.write_varchar65535(value));
                Ok(2 + str_len as u16)
            }
            _ => Err(TupleError::UnsupportedColumnType.into()),
        }
    }

    /// Store a tuple's values into the page at the given offset, in the encoding that
    /// `PageTuple` reads back: a null-flag bitmap followed by the non-null column values in
    /// schema order.
    ///
    /// # Arguments
    /// * offset - The offset at which to put the tuple.
    /// * schema - A reference to the schema the tuple should follow.
    /// * tuple - A reference to the tuple itself.
    ///
    /// # Errors
    /// Fails if the tuple's arity does not match the schema, or if a value cannot be read or
    /// written.
    pub fn store_new_tuple<T: Tuple + ?Sized>(&mut self,
                                              offset: u16,
                                              schema: &Schema,
                                              tuple: &mut T)
                                              -> Result<(), Error> {
        if schema.num_columns() != tuple.get_column_count() {
            return Err(Error::WrongArity(tuple.get_column_count(), schema.num_columns()));
        }

        let mut cur_offset = offset + get_null_flags_size(schema.num_columns());
        for (col_idx, col_info) in schema.iter().enumerate() {
            let col_type = col_info.column_type;
            let value = try!(tuple.get_column_value(col_idx));
            let mut data_size = 0;

            if value == Literal::Null {
                try!(self.set_null_flag(offset, col_idx, true));
            } else {
                try!(self.set_null_flag(offset, col_idx, false));
                data_size = try!(self.write_non_null_value(cur_offset, col_type, value));
            }

            cur_offset += data_size;
        }
        Ok(())
    }
}

impl Read for DBPage {
    #[inline]
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        match self.read_at_position(self.cur_page_position as usize, buffer) {
            Ok(bytes) => {
                self.cur_page_position += bytes as u64;
                Ok(bytes)
            }
            Err(_) => Err(ErrorKind::Other.into()),
        }
    }
}

impl Write for DBPage {
    fn write(&mut self, buffer: &[u8]) -> io::Result<usize> {
        let position = self.cur_page_position as usize;
        match self.write_at_position(position, buffer) {
            Ok(bytes) => {
                self.cur_page_position += bytes as u64;
                Ok(bytes)
            }
            Err(_) => Err(ErrorKind::Other.into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for DBPage {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(offset) => {
                self.cur_page_position = (self.cur_page_position as i64 + offset) as u64;
            }
            SeekFrom::Start(offset) => {
                if offset > self.page_data.len() as u64 {
                    return Err(ErrorKind::Other.into());
                }
                self.cur_page_position = offset;
            }
            SeekFrom::End(offset) => {
                let new_pos: i64 = self.page_data.len() as i64 + offset;
                if new_pos < 0 {
                    return Err(ErrorKind::Other.into());
                }
                self.cur_page_position = new_pos as u64;
            }
        }
        Ok(self.cur_page_position)
    }
}

impl Pinnable for DBPage {
    fn pin(&mut self) {
        self.pin_count += 1;
    }

    fn unpin(&mut self) -> Result<(), PinError> {
        if self.pin_count == 0 {
            return Err(PinError::PinCountNotPositive(self.pin_count));
        }

        self.pin_count -= 1;

        Ok(())
    }

    fn get_pin_count(&self) -> u32 {
        self.pin_count
    }
}
