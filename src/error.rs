/*
  Copyright© 2023 Raúl Wolters(1)

  This file is part of colony-watershed.

  colony-watershed is free software: you can redistribute it and/or modify it
  under the terms of the European Union Public License version 1.2 or later, as
  published by the European Commission.

  colony-watershed is distributed in the hope that it will be useful, but
  WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
  FITNESS FOR A PARTICULAR PURPOSE. See the European Union Public License for
  more details.

  You should have received a copy of the EUPL in an/all official language(s) of
  the European Union along with colony-watershed.  If not, see
  <https://ec.europa.eu/info/european-union-public-licence_en/>.

  (1) Resident of the Kingdom of the Netherlands; agreement between licensor and
  licensee subject to Dutch law as per article 15 of the EUPL.
*/

use thiserror::Error;

/// Errors that can occur while counting colonies. None of these are fatal to
/// the caller: they only abort the count that produced them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CountError {
  /// Resolution outside of the supported `2..=25` range
  #[error(
    "resolution was set at {0}, which is outside the allowed range ({min}..={max})",
    min = crate::MIN_RESOLUTION,
    max = crate::MAX_RESOLUTION
  )]
  InvalidResolution(u8),

  /// The image has foreground pixels but not a single background pixel, so
  /// there is nothing to measure distances against.
  #[error("image contains no background pixels, distances cannot be computed")]
  NoBackground,

  /// Threshold outside of `0.0..=1.0` (or NaN)
  #[error("threshold {0} is outside the allowed range (0.0..=1.0)")]
  InvalidThreshold(f64),

  /// Colour buffers must be RGB or RGBA
  #[error("expected 3 or 4 colour channels, got {0}")]
  InvalidChannels(usize),

  /// Two buffers that should describe the same image do not
  #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
  ShapeMismatch { expected: (usize, usize), actual: (usize, usize) },
}

/// Result type for counting operations
pub type CountResult<T> = Result<T, CountError>;
