// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image resource handed to the host by image-loading operations.

use std::any::Any;

use kitbridge_core::error::Result;
use kitbridge_core::{HostObject, PackedBytes, Variant};

use super::unknown_property;
use crate::native::NativeImage;

const PROPERTIES: &[&str] = &["width", "height", "format", "data"];

/// PNG image owned by the host. Its bytes are a copy of the native buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: PackedBytes,
}

impl Image {
    pub const CLASS: &'static str = "Image";
    pub const FORMAT: &'static str = "png";

    pub fn from_native(image: &NativeImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            data: PackedBytes::copy_from(&image.png),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &PackedBytes {
        &self.data
    }
}

impl HostObject for Image {
    fn class_name(&self) -> &'static str {
        Self::CLASS
    }

    fn property_list(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get(&self, property: &str) -> Result<Variant> {
        match property {
            "width" => Ok(Variant::Int(self.width.into())),
            "height" => Ok(Variant::Int(self.height.into())),
            "format" => Ok(Variant::String(Self::FORMAT.into())),
            "data" => Ok(Variant::Bytes(self.data.clone())),
            other => Err(unknown_property(Self::CLASS, other)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_are_copied_not_shared() {
        let mut native = NativeImage {
            width: 2,
            height: 1,
            png: vec![0x89, b'P', b'N', b'G'],
        };
        let image = Image::from_native(&native);
        native.png.clear();
        assert_eq!(image.data().as_slice(), &[0x89, b'P', b'N', b'G']);
        assert_eq!(image.get("width").expect("width"), Variant::Int(2));
    }
}
