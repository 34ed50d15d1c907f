//! Clip descriptor parsing and deterministic path derivation.
//!
//! A descriptor is one line of the clip info file with nine comma-separated
//! fields in the fixed order `name,H,W,S,E,L,T,R,B`:
//!
//! | field | meaning                                   |
//! |-------|-------------------------------------------|
//! | name  | source video, found at `<input_dir>/name.mp4` |
//! | H, W  | reference frame height and width         |
//! | S, E  | inclusive start and end frame            |
//! | L, T, R, B | crop box in reference coordinates   |
//!
//! Parsing is all-or-nothing: a line either yields a complete [`ClipSpec`]
//! or a [`ParseError`].

use crate::config::SOURCE_EXTENSION;
use crate::error::{CoreError, CoreResult, ParseError};

use std::fs;
use std::path::{Path, PathBuf};

/// Number of fields in a descriptor line.
pub const DESCRIPTOR_FIELDS: usize = 9;

const FIELD_NAMES: [&str; DESCRIPTOR_FIELDS] = [
    "video_name",
    "ref_height",
    "ref_width",
    "start_frame",
    "end_frame",
    "left",
    "top",
    "right",
    "bottom",
];

/// One clip to extract, in reference coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSpec {
    pub video_name: String,
    pub ref_height: u32,
    pub ref_width: u32,
    pub start_frame: u64,
    pub end_frame: u64,
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ClipSpec {
    /// Parses one descriptor line.
    ///
    /// Leading and trailing whitespace is ignored, as is whitespace around
    /// each field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use clipcrop_core::ClipSpec;
    ///
    /// let spec = ClipSpec::parse("abc123,720,1280,0,29,100,50,612,562").unwrap();
    /// assert_eq!(spec.video_name, "abc123");
    /// assert_eq!(spec.end_frame, 29);
    /// assert!(ClipSpec::parse("abc123,720,1280").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() != DESCRIPTOR_FIELDS {
            return Err(ParseError::FieldCount {
                expected: DESCRIPTOR_FIELDS,
                found: fields.len(),
            });
        }

        let video_name = fields[0];
        if video_name.is_empty() {
            return Err(ParseError::EmptyName);
        }

        let spec = ClipSpec {
            video_name: video_name.to_string(),
            ref_height: parse_field(fields[1], FIELD_NAMES[1])?,
            ref_width: parse_field(fields[2], FIELD_NAMES[2])?,
            start_frame: parse_field(fields[3], FIELD_NAMES[3])?,
            end_frame: parse_field(fields[4], FIELD_NAMES[4])?,
            left: parse_field(fields[5], FIELD_NAMES[5])?,
            top: parse_field(fields[6], FIELD_NAMES[6])?,
            right: parse_field(fields[7], FIELD_NAMES[7])?,
            bottom: parse_field(fields[8], FIELD_NAMES[8])?,
        };
        spec.check_geometry()?;
        Ok(spec)
    }

    fn check_geometry(&self) -> Result<(), ParseError> {
        if self.ref_height == 0 || self.ref_width == 0 {
            return Err(ParseError::InvalidRange(format!(
                "reference size {}x{} must be positive",
                self.ref_width, self.ref_height
            )));
        }
        if self.start_frame > self.end_frame {
            return Err(ParseError::InvalidRange(format!(
                "start frame {} is after end frame {}",
                self.start_frame, self.end_frame
            )));
        }
        if self.left >= self.right || self.top >= self.bottom {
            return Err(ParseError::InvalidRange(format!(
                "crop box L={} T={} R={} B={} is empty",
                self.left, self.top, self.right, self.bottom
            )));
        }
        if self.right > self.ref_width || self.bottom > self.ref_height {
            return Err(ParseError::InvalidRange(format!(
                "crop box R={} B={} exceeds reference size {}x{}",
                self.right, self.bottom, self.ref_width, self.ref_height
            )));
        }
        Ok(())
    }

    /// Deterministic output file name; its existence marks the clip as done.
    ///
    /// ```rust
    /// use clipcrop_core::ClipSpec;
    ///
    /// let spec = ClipSpec::parse("abc,100,200,3,9,10,20,30,40").unwrap();
    /// assert_eq!(spec.output_file_name(), "abc_S3_E9_L10_T20_R30_B40.mp4");
    /// ```
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_S{}_E{}_L{}_T{}_R{}_B{}.{}",
            self.video_name,
            self.start_frame,
            self.end_frame,
            self.left,
            self.top,
            self.right,
            self.bottom,
            SOURCE_EXTENSION
        )
    }

    /// Path of the output clip inside `output_dir`.
    #[must_use]
    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.output_file_name())
    }

    /// Path of the source video inside `input_dir`.
    #[must_use]
    pub fn source_path(&self, input_dir: &Path) -> PathBuf {
        input_dir.join(format!("{}.{}", self.video_name, SOURCE_EXTENSION))
    }
}

fn parse_field<T: std::str::FromStr>(value: &str, field: &'static str) -> Result<T, ParseError> {
    value.parse::<T>().map_err(|_| ParseError::InvalidInteger {
        field,
        value: value.to_string(),
    })
}

/// A raw descriptor line together with its 1-based line number in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorLine {
    pub line_number: usize,
    pub text: String,
}

/// Reads the descriptor file into work items.
///
/// Lines are kept unparsed so a malformed line fails only its own item.
/// Blank lines are dropped. An unreadable file is fatal for the batch.
pub fn read_descriptor_file(path: &Path) -> CoreResult<Vec<DescriptorLine>> {
    let contents = fs::read_to_string(path).map_err(|source| CoreError::DescriptorFile {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| DescriptorLine {
            line_number: index + 1,
            text: line.trim().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_line() {
        let spec = ClipSpec::parse("  vid_01,720,1280,15,90,100,50,612,562 \n").unwrap();
        assert_eq!(
            spec,
            ClipSpec {
                video_name: "vid_01".to_string(),
                ref_height: 720,
                ref_width: 1280,
                start_frame: 15,
                end_frame: 90,
                left: 100,
                top: 50,
                right: 612,
                bottom: 562,
            }
        );
    }

    #[test]
    fn test_parse_tolerates_spaces_around_fields() {
        let spec = ClipSpec::parse("v, 100 ,200, 0,0 ,1,2,3,4").unwrap();
        assert_eq!(spec.ref_height, 100);
        assert_eq!(spec.start_frame, 0);
        assert_eq!(spec.end_frame, 0);
    }

    #[test]
    fn test_parse_wrong_field_count() {
        assert_eq!(
            ClipSpec::parse("v,100,200,0,10,1,2,3"),
            Err(ParseError::FieldCount { expected: 9, found: 8 })
        );
        assert_eq!(
            ClipSpec::parse("v,100,200,0,10,1,2,3,4,5"),
            Err(ParseError::FieldCount { expected: 9, found: 10 })
        );
        assert!(ClipSpec::parse("").is_err());
    }

    #[test]
    fn test_parse_non_integer_fields() {
        assert_eq!(
            ClipSpec::parse("v,100,200,0,10.5,1,2,3,4"),
            Err(ParseError::InvalidInteger {
                field: "end_frame",
                value: "10.5".to_string()
            })
        );
        assert!(matches!(
            ClipSpec::parse("v,100,abc,0,10,1,2,3,4"),
            Err(ParseError::InvalidInteger { field: "ref_width", .. })
        ));
        assert!(matches!(
            ClipSpec::parse("v,100,200,0,10,-1,2,3,4"),
            Err(ParseError::InvalidInteger { field: "left", .. })
        ));
    }

    #[test]
    fn test_parse_rejects_bad_geometry() {
        assert_eq!(ClipSpec::parse(",100,200,0,10,1,2,3,4"), Err(ParseError::EmptyName));
        // start after end
        assert!(matches!(
            ClipSpec::parse("v,100,200,11,10,1,2,3,4"),
            Err(ParseError::InvalidRange(_))
        ));
        // left == right
        assert!(matches!(
            ClipSpec::parse("v,100,200,0,10,3,2,3,4"),
            Err(ParseError::InvalidRange(_))
        ));
        // bottom beyond reference height
        assert!(matches!(
            ClipSpec::parse("v,100,200,0,10,1,2,3,101"),
            Err(ParseError::InvalidRange(_))
        ));
        // zero reference size
        assert!(matches!(
            ClipSpec::parse("v,0,200,0,10,1,2,3,4"),
            Err(ParseError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_paths() {
        let spec = ClipSpec::parse("abc,100,200,3,9,10,20,30,40").unwrap();
        assert_eq!(
            spec.source_path(Path::new("/videos")),
            PathBuf::from("/videos/abc.mp4")
        );
        assert_eq!(
            spec.output_path(Path::new("/clips")),
            PathBuf::from("/clips/abc_S3_E9_L10_T20_R30_B40.mp4")
        );
    }

    #[test]
    fn test_read_descriptor_file_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clips.txt");
        fs::write(&path, "a,1,1,0,0,0,0,1,1\n\n   \n  bad line  \nb,1,1,0,0,0,0,1,1").unwrap();

        let lines = read_descriptor_file(&path).unwrap();
        assert_eq!(
            lines,
            vec![
                DescriptorLine { line_number: 1, text: "a,1,1,0,0,0,0,1,1".to_string() },
                DescriptorLine { line_number: 4, text: "bad line".to_string() },
                DescriptorLine { line_number: 5, text: "b,1,1,0,0,0,0,1,1".to_string() },
            ]
        );
    }

    #[test]
    fn test_read_descriptor_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_descriptor_file(&dir.path().join("nope.txt"));
        assert!(matches!(result, Err(CoreError::DescriptorFile { .. })));
    }
}
