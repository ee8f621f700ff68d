extern crate favico;

use favico::{EncodedRaster, Error};

//===========================================================================//

fn fake_png(tag: u8, len: usize) -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.resize(len, tag);
    data
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

//===========================================================================//

#[test]
fn header_counts_images() {
    let images: Vec<EncodedRaster> = [16, 32, 48, 64, 128]
        .iter()
        .map(|&size| EncodedRaster::new(size, size, fake_png(size as u8, 20)))
        .collect();
    let ico = favico::encode(&images).unwrap();
    assert_eq!(&ico.data()[..6], b"\x00\x00\x01\x00\x05\x00");
    assert!(favico::is_ico(ico.data()));
}

#[test]
fn directory_fields_and_spans() {
    let payloads = [fake_png(1, 31), fake_png(2, 9), fake_png(3, 100)];
    let sizes = [16u32, 48, 256];
    let images: Vec<EncodedRaster> = sizes
        .iter()
        .zip(payloads.iter())
        .map(|(&size, data)| EncodedRaster::new(size, size, data.clone()))
        .collect();
    let ico = favico::encode(&images).unwrap();
    let data = ico.data();
    let total: usize = payloads.iter().map(|payload| payload.len()).sum();
    assert_eq!(data.len(), 6 + 16 * 3 + total);

    let mut expected_offset = 6 + 16 * 3;
    let mut reassembled = Vec::new();
    for (index, &size) in sizes.iter().enumerate() {
        let entry = &data[6 + 16 * index..][..16];
        let size_byte = if size == 256 { 0 } else { size as u8 };
        assert_eq!(entry[0], size_byte);
        assert_eq!(entry[1], size_byte);
        assert_eq!(entry[2], 0);
        assert_eq!(entry[3], 0);
        assert_eq!(read_u16(entry, 4), 1);
        assert_eq!(read_u16(entry, 6), 32);
        let len = read_u32(entry, 8) as usize;
        let offset = read_u32(entry, 12) as usize;
        assert_eq!(len, payloads[index].len());
        assert_eq!(offset, expected_offset);
        assert!(offset + len <= data.len());
        reassembled.extend_from_slice(&data[offset..offset + len]);
        expected_offset += len;
    }
    assert_eq!(reassembled, payloads.concat());
    assert_eq!(&data[6 + 16 * 3..], reassembled.as_slice());
}

#[test]
fn single_image_offset() {
    let ico = favico::encode(&[EncodedRaster::new(32, 32, fake_png(0, 12))])
        .unwrap();
    assert_eq!(read_u32(ico.data(), 6 + 12), 22);
    let directory = ico.directory().unwrap();
    assert_eq!(directory.entries().len(), 1);
    assert_eq!(directory.entries()[0].data_offset(), 22);
    assert!(directory.entries()[0].is_png());
}

#[test]
fn empty_input_always_fails_the_same_way() {
    for _ in 0..3 {
        match favico::encode(&[]) {
            Err(Error::EmptyInput) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}

#[test]
fn oversize_entry_is_named() {
    let images = [
        EncodedRaster::new(16, 16, fake_png(0, 10)),
        EncodedRaster::new(32, 32, fake_png(0, 10)),
        EncodedRaster::new(512, 512, fake_png(0, 10)),
    ];
    let error = favico::encode(&images).unwrap_err();
    match error {
        Error::MalformedEntry { index, ref reason } => {
            assert_eq!(index, 2);
            assert!(reason.contains("512x512"), "{}", reason);
        }
        ref other => panic!("unexpected error: {:?}", other),
    }
    assert!(error.to_string().contains("index 2"));
}

#[test]
fn from_png_reads_real_dimensions() {
    let image = image::RgbaImage::new(24, 24);
    let mut data = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut data), image::ImageFormat::Png)
        .unwrap();
    let raster = EncodedRaster::from_png(data).unwrap();
    assert_eq!((raster.width(), raster.height()), (24, 24));
    let ico = favico::encode(&[raster]).unwrap();
    assert_eq!(ico.directory().unwrap().entries()[0].width(), 24);
}

//===========================================================================//
