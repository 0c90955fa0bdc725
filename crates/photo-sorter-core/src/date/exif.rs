use anyhow::{bail, Context};
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::io::Cursor;

use super::CaptureDateSource;

/// EXIF datetimes have no timezone info - they are local time as-is.
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Reads `DateTimeOriginal` from any container `kamadak-exif` understands
/// (JPEG, TIFF and TIFF-based raw, HEIF, PNG, WebP).
#[derive(Debug, Default, Clone, Copy)]
pub struct ExifReader;

impl CaptureDateSource for ExifReader {
    fn capture_time(&self, bytes: &[u8]) -> anyhow::Result<Option<NaiveDateTime>> {
        let data = Reader::new()
            .read_from_container(&mut Cursor::new(bytes))
            .context("no readable EXIF block")?;

        let Some(field) = data.get_field(Tag::DateTimeOriginal, In::PRIMARY) else {
            return Ok(None);
        };

        let raw = match &field.value {
            Value::Ascii(parts) => match parts.first() {
                Some(part) => String::from_utf8_lossy(part).into_owned(),
                None => return Ok(None),
            },
            other => bail!("DateTimeOriginal has unexpected type {:?}", other),
        };

        let value = raw.trim_end_matches('\0').trim();
        let date = NaiveDateTime::parse_from_str(value, EXIF_DATETIME_FORMAT)
            .with_context(|| format!("malformed DateTimeOriginal {:?}", value))?;
        Ok(Some(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exif::experimental::Writer;
    use exif::Field;

    fn tiff_with(tag: Tag, value: Value) -> Vec<u8> {
        let field = Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        };
        let mut writer = Writer::new();
        writer.push_field(&field);
        let mut buf = Cursor::new(Vec::new());
        writer.write(&mut buf, false).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_reads_date_time_original() {
        let bytes = tiff_with(
            Tag::DateTimeOriginal,
            Value::Ascii(vec![b"2023:05:10 09:15:00".to_vec()]),
        );
        let date = ExifReader.capture_time(&bytes).unwrap().unwrap();
        assert_eq!(date.to_string(), "2023-05-10 09:15:00");
    }

    #[test]
    fn test_other_date_tags_are_ignored() {
        let bytes = tiff_with(Tag::DateTime, Value::Ascii(vec![b"2019:01:01 00:00:00".to_vec()]));
        assert!(ExifReader.capture_time(&bytes).unwrap().is_none());
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let bytes = tiff_with(
            Tag::DateTimeOriginal,
            Value::Ascii(vec![b"    :  :     :  :  ".to_vec()]),
        );
        assert!(ExifReader.capture_time(&bytes).is_err());
    }

    #[test]
    fn test_unknown_container_is_an_error() {
        assert!(ExifReader.capture_time(b"not an image at all").is_err());
        assert!(ExifReader.capture_time(&[]).is_err());
    }
}
