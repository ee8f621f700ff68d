use crate::error::{Error, Result};
use crate::raster::{EncodedRaster, MAX_ICO_DIMENSION, PNG_SIGNATURE};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};

//===========================================================================//

/// The media type of an ICO file.
pub const ICO_MEDIA_TYPE: &str = "image/x-icon";

/// The conventional download name of a favicon bundle.
pub const ICO_FILE_NAME: &str = "favicon.ico";

// The size of the ICONDIR header and of each ICONDIRENTRY, in bytes.
const ICONDIR_LEN: u32 = 6;
const ICONDIRENTRY_LEN: u32 = 16;

// The ICONDIR resource type for icons (cursors would be 2).
const ICON_RESOURCE_TYPE: u16 = 1;

// Every entry is written as true-color RGBA.
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

//===========================================================================//

/// Returns true if `data` starts with the ICO signature (a reserved zero
/// followed by resource type 1, both little-endian `u16`s).
pub fn is_ico(data: &[u8]) -> bool {
    data.starts_with(&[0x00, 0x00, 0x01, 0x00])
}

/// Packs encoded images into an ICO file.  The entries are written in the
/// order given; callers wanting reproducible output should sort ascending by
/// size first.  Fails without producing anything if `images` is empty or if
/// any image has a zero or too-large dimension or no data.
pub fn encode(images: &[EncodedRaster]) -> Result<IcoContainer> {
    if images.is_empty() {
        return Err(Error::EmptyInput);
    }
    if images.len() > (u16::MAX as usize) {
        invalid_input!(
            "Too many images for one ICO file (was {}, but max is {})",
            images.len(),
            u16::MAX
        );
    }
    let header_len = ICONDIR_LEN + ICONDIRENTRY_LEN * (images.len() as u32);
    let mut total_len = header_len;
    for (index, image) in images.iter().enumerate() {
        validate_entry(index, image)?;
        total_len = match u32::try_from(image.data().len())
            .ok()
            .and_then(|len| total_len.checked_add(len))
        {
            Some(total_len) => total_len,
            None => malformed_entry!(
                index,
                "Image data pushes the ICO file past 4 GiB"
            ),
        };
    }

    let mut data = Vec::<u8>::with_capacity(total_len as usize);
    data.write_u16::<LittleEndian>(0)?; // reserved
    data.write_u16::<LittleEndian>(ICON_RESOURCE_TYPE)?;
    data.write_u16::<LittleEndian>(images.len() as u16)?;
    let mut data_offset = header_len;
    for image in images.iter() {
        // A width/height byte of zero indicates a size of 256.
        data.write_u8(dimension_byte(image.width()))?;
        data.write_u8(dimension_byte(image.height()))?;
        data.write_u8(0)?; // num colors
        data.write_u8(0)?; // reserved
        data.write_u16::<LittleEndian>(COLOR_PLANES)?;
        data.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
        let data_size = image.data().len() as u32;
        data.write_u32::<LittleEndian>(data_size)?;
        data.write_u32::<LittleEndian>(data_offset)?;
        data_offset += data_size;
    }
    debug_assert_eq!(data.len(), header_len as usize);
    for image in images.iter() {
        data.write_all(image.data())?;
    }

    if data.len() != total_len as usize || data_offset != total_len {
        invalid_data!(
            "ICO layout mismatch (wrote {} bytes, but expected {})",
            data.len(),
            total_len
        );
    }
    tracing::debug!(
        entries = images.len(),
        bytes = data.len(),
        "Encoded ICO file"
    );
    Ok(IcoContainer { data })
}

fn validate_entry(index: usize, image: &EncodedRaster) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        malformed_entry!(
            index,
            "Missing dimensions ({}x{})",
            image.width(),
            image.height()
        );
    }
    if image.width() > MAX_ICO_DIMENSION || image.height() > MAX_ICO_DIMENSION
    {
        malformed_entry!(
            index,
            "Image is too large (was {}x{}, but max is {}x{})",
            image.width(),
            image.height(),
            MAX_ICO_DIMENSION,
            MAX_ICO_DIMENSION
        );
    }
    if image.data().is_empty() {
        malformed_entry!(index, "Image data is empty");
    }
    Ok(())
}

fn dimension_byte(dimension: u32) -> u8 {
    if dimension >= MAX_ICO_DIMENSION {
        0
    } else {
        dimension as u8
    }
}

//===========================================================================//

/// An encoded ICO file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcoContainer {
    data: Vec<u8>,
}

impl IcoContainer {
    /// Returns the raw bytes of the file.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the container, returning the raw bytes of the file.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the length of the file, in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the file has no bytes.  A container built by `encode`
    /// is never empty, since it holds at least one image.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `image/x-icon`.
    pub fn media_type(&self) -> &'static str {
        ICO_MEDIA_TYPE
    }

    /// Returns the conventional download name, `favicon.ico`.
    pub fn file_name(&self) -> &'static str {
        ICO_FILE_NAME
    }

    /// Parses the container's directory back out.
    pub fn directory(&self) -> Result<IcoDirectory> {
        IcoDirectory::read(Cursor::new(&self.data))
    }

    /// Writes the file out.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.data)?;
        Ok(())
    }
}

//===========================================================================//

/// The parsed contents of an ICO file.
#[derive(Clone, Debug)]
pub struct IcoDirectory {
    entries: Vec<IcoDirEntry>,
}

impl IcoDirectory {
    /// Returns the entries, in directory order.
    pub fn entries(&self) -> &[IcoDirEntry] {
        &self.entries
    }

    /// Reads an ICO file, checking that every entry's data lies inside the
    /// file and that no two entries share bytes.
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<IcoDirectory> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        let reserved = reader.read_u16::<LittleEndian>()?;
        if reserved != 0 {
            invalid_data!(
                "Invalid reserved field value in ICONDIR \
                 (was {}, but must be 0)",
                reserved
            );
        }
        let restype = reader.read_u16::<LittleEndian>()?;
        if restype != ICON_RESOURCE_TYPE {
            invalid_data!("Invalid resource type ({})", restype);
        }
        let num_entries = reader.read_u16::<LittleEndian>()? as usize;
        let header_len = ICONDIR_LEN as u64
            + ICONDIRENTRY_LEN as u64 * num_entries as u64;
        if header_len > file_len {
            invalid_data!(
                "ICONDIR claims {} entries, but the file is only {} bytes",
                num_entries,
                file_len
            );
        }
        let mut entries = Vec::<IcoDirEntry>::with_capacity(num_entries);
        let mut spans = Vec::<(u64, u64)>::with_capacity(num_entries);
        for _ in 0..num_entries {
            let width_byte = reader.read_u8()?;
            let height_byte = reader.read_u8()?;
            let num_colors = reader.read_u8()?;
            let reserved = reader.read_u8()?;
            if reserved != 0 {
                invalid_data!(
                    "Invalid reserved field value in ICONDIRENTRY \
                     (was {}, but must be 0)",
                    reserved
                );
            }
            let color_planes = reader.read_u16::<LittleEndian>()?;
            let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
            let data_size = reader.read_u32::<LittleEndian>()?;
            let data_offset = reader.read_u32::<LittleEndian>()?;
            let start = data_offset as u64;
            let end = start + data_size as u64;
            if start < header_len || end > file_len {
                invalid_data!(
                    "Entry data at {}..{} lies outside the image region \
                     ({}..{})",
                    start,
                    end,
                    header_len,
                    file_len
                );
            }
            spans.push((start, end));
            // A width/height byte of zero indicates a size of 256.
            let width = if width_byte == 0 { 256 } else { width_byte as u32 };
            let height =
                if height_byte == 0 { 256 } else { height_byte as u32 };
            let entry = IcoDirEntry {
                width,
                height,
                num_colors,
                color_planes,
                bits_per_pixel,
                data_offset,
                data: Vec::new(),
            };
            entries.push(entry);
        }
        let mut sorted: Vec<(u64, u64)> =
            spans.iter().copied().filter(|&(start, end)| end > start).collect();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            if pair[0].1 > pair[1].0 {
                invalid_data!(
                    "Entry data at {}..{} overlaps entry data at {}..{}",
                    pair[0].0,
                    pair[0].1,
                    pair[1].0,
                    pair[1].1
                );
            }
        }
        for (index, &(start, end)) in spans.iter().enumerate() {
            reader.seek(SeekFrom::Start(start))?;
            let mut data = vec![0u8; (end - start) as usize];
            reader.read_exact(&mut data)?;
            entries[index].data = data;
        }
        Ok(IcoDirectory { entries })
    }
}

//===========================================================================//

/// One entry in an ICO file.
#[derive(Clone, Debug)]
pub struct IcoDirEntry {
    width: u32,
    height: u32,
    num_colors: u8,
    color_planes: u16,
    bits_per_pixel: u16,
    data_offset: u32,
    data: Vec<u8>,
}

impl IcoDirEntry {
    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the palette size; zero for true-color images.
    pub fn num_colors(&self) -> u8 {
        self.num_colors
    }

    /// Returns the number of color planes.
    pub fn color_planes(&self) -> u16 {
        self.color_planes
    }

    /// Returns the bits-per-pixel (color depth) of the image.
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the absolute offset of the image data within the file.
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Returns the length of the image data, in bytes.
    pub fn data_size(&self) -> u32 {
        self.data.len() as u32
    }

    /// Returns true if the image is encoded as a PNG.
    pub fn is_png(&self) -> bool {
        self.data.starts_with(PNG_SIGNATURE)
    }

    /// Returns the raw, encoded image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

//===========================================================================//


//===========================================================================//
