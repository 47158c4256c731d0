use crate::{
    attributes::{self, Attribute, StudyLabels},
    enums::SortBy,
    error::Error as CoreError,
    frame::Frame,
    window::WindowParameters,
};

use dicom::{
    core::header::Header,
    object::{FileDicomObject, InMemDicomObject, mem::InMemElement, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, VoiLutOption},
};
use dicom_dictionary_std::tags;
use ndarray::s;
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StudyLoaderError {
    #[error("No valid DICOM images found")]
    NoValidImages,

    #[error("No pixel data in DICOM object")]
    NoPixelData,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("Pixel data error: {0}")]
    PixelData(String),

    #[error("Frame error: {0}")]
    Frame(#[from] CoreError),
}

/// Frames, window defaults and labels of one loaded study.
#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    pub frames: Vec<Frame>,
    pub window: Option<WindowParameters>,
    pub labels: StudyLabels,
}

impl Study {
    /// Assemble a study from attributes decoded at parse time.
    pub fn from_attributes(attributes: Vec<Attribute>) -> Self {
        let window = attributes::window_defaults(&attributes);
        let mut frames = Vec::new();
        let mut labels = StudyLabels::default();

        for attribute in attributes {
            match attribute {
                Attribute::PixelFrames(decoded) => frames.extend(decoded),
                Attribute::PersonName(name) => labels.patient_name = name,
                Attribute::ShortText { tag, value } if tag == tags::PATIENT_ID => {
                    labels.patient_id = value
                }
                Attribute::ShortText { tag, value } if tag == tags::STUDY_DESCRIPTION => {
                    labels.study_description = value
                }
                Attribute::ShortText { tag, value } => debug!(%tag, value = %value, "attribute"),
                Attribute::WindowCenter(_) | Attribute::WindowWidth(_) => {}
                Attribute::Unknown { tag, name, value } => match name {
                    Some(name) => debug!(%tag, dicos_name = name, value = %value, "attribute"),
                    None => debug!(%tag, value = %value, "attribute"),
                },
            }
        }

        Self {
            frames,
            window,
            labels,
        }
    }
}

pub struct StudyLoader;

impl StudyLoader {
    /// Load a study from DICOM objects
    ///
    /// # Arguments
    ///
    /// * `dicom_objects` - Slice of DICOM file objects
    /// * `sort_by` - Method to sort the objects before their frames are
    ///   concatenated
    ///
    /// Labels and window defaults come from the first object in sorted
    /// order. Objects whose pixel data cannot be decoded are skipped.
    ///
    /// # Errors
    ///
    /// Returns error if no frames could be decoded
    pub fn load_from_dicom_objects(
        dicom_objects: &[FileDicomObject<InMemDicomObject>],
        sort_by: SortBy,
    ) -> Result<Study, StudyLoaderError> {
        let mut objects_with_order: Vec<_> = dicom_objects
            .iter()
            .filter_map(|dicom_object| {
                Self::get_sort_order(dicom_object, &sort_by).map(|order| (order, dicom_object))
            })
            .collect();

        Self::sort_objects(&mut objects_with_order, sort_by);

        let mut ordered = objects_with_order.into_iter().map(|(_, object)| object);
        let first = ordered.next().ok_or(StudyLoaderError::NoValidImages)?;

        let mut study = Study::from_attributes(Self::decode_attributes(first));
        for dicom_object in ordered {
            match Self::decode_frames(dicom_object) {
                Ok(frames) => study.frames.extend(frames),
                Err(err) => warn!(error = %err, "skipping object without usable pixel data"),
            }
        }

        if study.frames.is_empty() {
            return Err(StudyLoaderError::NoValidImages);
        }

        info!(
            frames = study.frames.len(),
            patient = %study.labels.patient_id,
            "loaded study"
        );
        Ok(study)
    }

    /// Load a study from file paths
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path> + Sync],
        sort_by: SortBy,
    ) -> Result<Study, StudyLoaderError> {
        let objects: Result<Vec<_>, _> = paths
            .par_iter()
            .map(|path| open_file(path.as_ref()))
            .collect();

        Self::load_from_dicom_objects(&objects?, sort_by)
    }

    /// Load a study from a directory containing .dcm or .dcs files
    ///
    /// Files that cannot be opened are logged and skipped.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Study, StudyLoaderError> {
        let mut paths: Vec<_> = fs::read_dir(path.as_ref())?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| {
                        ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dcs")
                    })
            })
            .collect();

        if paths.is_empty() {
            return Err(StudyLoaderError::NoValidImages);
        }
        paths.sort();

        let objects: Vec<_> = paths
            .par_iter()
            .filter_map(|path| match open_file(path) {
                Ok(object) => Some(object),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "could not open DICOM file");
                    None
                }
            })
            .collect();

        Self::load_from_dicom_objects(&objects, sort_by)
    }

    /// Load a study from a single file or a directory
    pub fn load_from_path(
        path: impl AsRef<Path>,
        sort_by: SortBy,
    ) -> Result<Study, StudyLoaderError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_from_directory(path, sort_by)
        } else {
            Self::load_from_file_paths(&[PathBuf::from(path)], sort_by)
        }
    }

    /// Decode every data element of an object into an [`Attribute`].
    pub fn decode_attributes(dicom_object: &FileDicomObject<InMemDicomObject>) -> Vec<Attribute> {
        dicom_object
            .iter()
            .filter_map(|element| Self::decode_attribute(dicom_object, element))
            .collect()
    }

    fn decode_attribute(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        element: &InMemElement,
    ) -> Option<Attribute> {
        let tag = element.tag();
        match tag {
            tags::PIXEL_DATA => match Self::decode_frames(dicom_object) {
                Ok(frames) => Some(Attribute::PixelFrames(frames)),
                Err(err) => {
                    warn!(error = %err, "could not decode pixel data");
                    None
                }
            },
            tags::PATIENT_NAME => Some(Attribute::PersonName(Self::element_text(element)?)),
            tags::PATIENT_ID | tags::STUDY_DESCRIPTION => Some(Attribute::ShortText {
                tag,
                value: Self::element_text(element)?,
            }),
            tags::WINDOW_CENTER => Self::first_float(element).map(Attribute::WindowCenter),
            tags::WINDOW_WIDTH => Self::first_float(element).map(Attribute::WindowWidth),
            _ => Some(Attribute::Unknown {
                tag,
                name: attributes::lookup_tag_name(tag.group(), tag.element()),
                value: Self::element_text(element).unwrap_or_default(),
            }),
        }
    }

    fn element_text(element: &InMemElement) -> Option<String> {
        element
            .to_str()
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn first_float(element: &InMemElement) -> Option<f64> {
        element
            .to_multi_float64()
            .ok()
            .and_then(|values| values.first().copied())
    }

    /// Decode all frames of an object into modality values.
    pub fn decode_frames(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Vec<Frame>, StudyLoaderError> {
        if dicom_object.element(tags::PIXEL_DATA).is_err() {
            return Err(StudyLoaderError::NoPixelData);
        }
        let pixel_data = dicom_object
            .decode_pixel_data()
            .map_err(|err| StudyLoaderError::PixelData(err.to_string()))?;
        let options = ConvertOptions::new()
            .with_modality_lut(ModalityLutOption::Default)
            .with_voi_lut(VoiLutOption::Identity);
        let array = pixel_data
            .to_ndarray_with_options::<i32>(&options)
            .map_err(|err| StudyLoaderError::PixelData(err.to_string()))?;

        // (frames, rows, columns, samples); only the first sample is used
        array
            .outer_iter()
            .map(|frame| Frame::from_array(frame.slice(s![.., .., 0]).to_owned()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(StudyLoaderError::from)
    }

    fn get_sort_order(
        dicom_object: &FileDicomObject<InMemDicomObject>,
        sort_by: &SortBy,
    ) -> Option<Option<f32>> {
        match sort_by {
            SortBy::ImagePositionPatient => {
                // missing or malformed positions sort as None
                let pos = dicom_object
                    .element(tags::IMAGE_POSITION_PATIENT)
                    .ok()
                    .and_then(|element| element.to_multi_float32().ok())
                    .and_then(|pos| pos.get(2).copied());
                Some(pos)
            }
            SortBy::TablePosition => {
                let pos = dicom_object
                    .element(tags::TABLE_POSITION)
                    .ok()
                    .and_then(|element| element.to_float32().ok());
                Some(pos)
            }
            SortBy::InstanceNumber => {
                let num = dicom_object
                    .element(tags::INSTANCE_NUMBER)
                    .ok()
                    .and_then(|element| element.to_int::<i32>().ok())
                    .map(|n| n as f32);
                Some(num)
            }
            SortBy::None => Some(Some(0.0)),
        }
    }

    fn sort_objects<T>(objects_with_order: &mut [(Option<f32>, T)], sort_by: SortBy) {
        if !matches!(sort_by, SortBy::None) {
            objects_with_order
                .sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        }

        if matches!(sort_by, SortBy::ImagePositionPatient) {
            objects_with_order.reverse();
        }
    }
}
