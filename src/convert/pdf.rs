//! PDF conversion built on lopdf

use super::PageConverter;
use crate::error::{AssemblyError, Error, Result};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// PDF version written into generated documents
const PDF_VERSION: &str = "1.5";

/// Produces PDF artifacts
///
/// Every page image becomes a one-page PDF fragment whose media box matches
/// the raster dimensions (one pixel per point), with the image drawn to fill
/// the page. `merge_pages` reloads the fragments, renumbers their objects and
/// re-parents all pages under a fresh page tree, preserving input order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfConverter;

impl PageConverter for PdfConverter {
    fn convert_page(&self, image_bytes: &[u8]) -> Result<Vec<u8>> {
        let raster = image::load_from_memory(image_bytes)
            .map_err(|e| conversion(format!("cannot decode page image: {e}")))?
            .to_rgb8();
        let (width, height) = raster.dimensions();

        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(width),
                "Height" => i64::from(height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            raster.into_raw(),
        ));

        // The image operator draws into a unit square; scale it up to the
        // full media box.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Integer(i64::from(width)),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(i64::from(height)),
                        Object::Integer(0),
                        Object::Integer(0),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|e| conversion(format!("cannot encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(width)),
                Object::Integer(i64::from(height)),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => Object::Reference(image_id),
                },
            },
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| conversion(format!("cannot serialize page: {e}")))?;
        Ok(out)
    }

    fn merge_pages(&self, pages: &[Vec<u8>]) -> Result<Vec<u8>> {
        let mut merged = Document::with_version(PDF_VERSION);
        let mut page_ids: Vec<ObjectId> = Vec::new();

        for fragment in pages {
            let mut doc = Document::load_mem(fragment)
                .map_err(|e| merge_error(format!("cannot reload page fragment: {e}")))?;
            doc.renumber_objects_with(merged.max_id + 1);
            merged.max_id = doc.max_id;
            page_ids.extend(doc.get_pages().into_values());
            merged.objects.extend(doc.objects);
        }
        if page_ids.is_empty() {
            return Err(Error::Assembly(AssemblyError::NoPages));
        }

        let pages_id = merged.new_object_id();
        for &page_id in &page_ids {
            let page = merged
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| merge_error(format!("page object is not a dictionary: {e}")))?;
            page.set("Parent", Object::Reference(pages_id));
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let count = page_ids.len() as i64;
        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        merged.trailer.set("Root", catalog_id);
        merged.compress();

        let mut out = Vec::new();
        merged
            .save_to(&mut out)
            .map_err(|e| merge_error(format!("cannot serialize merged document: {e}")))?;
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

fn conversion(reason: String) -> Error {
    Error::Assembly(AssemblyError::Conversion(reason))
}

fn merge_error(reason: String) -> Error {
    Error::Assembly(AssemblyError::Merge(reason))
}
