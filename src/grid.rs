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

//! Foreground/background classification of an image.

use ndarray as nd;
use num_traits::ToPrimitive;

/// The binary image the counter works on. Each pixel is either *foreground*
/// (part of a colony) or *background*. The grid is stored as a row-major
/// `(height, width)` array, so the pixel at `(x, y)` sits at flat index
/// `x + y * width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
  mask: nd::Array2<bool>,
}

impl PixelGrid {
  /// Create a grid from a mask where `true` marks foreground pixels.
  pub fn from_mask(mask: nd::Array2<bool>) -> Self {
    //Flat indices assume standard layout
    PixelGrid { mask: mask.as_standard_layout().into_owned() }
  }

  /// Classify a numeric image. Pixels with a finite value of at least
  /// `threshold` become foreground, everything else (including NaN and
  /// infinities) becomes background.
  pub fn from_threshold<T>(img: nd::ArrayView2<T>, threshold: f64) -> Self
  where
    T: ToPrimitive + Copy,
  {
    let mask = img.mapv(|px| match px.to_f64() {
      Some(val) if val.is_finite() => val >= threshold,
      _ => false,
    });
    PixelGrid { mask }
  }

  pub fn width(&self) -> usize {
    self.mask.ncols()
  }

  pub fn height(&self) -> usize {
    self.mask.nrows()
  }

  /// `(height, width)`, the same convention `ndarray` uses
  pub fn shape(&self) -> (usize, usize) {
    self.mask.dim()
  }

  pub fn len(&self) -> usize {
    self.mask.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mask.is_empty()
  }

  pub fn view(&self) -> nd::ArrayView2<bool> {
    self.mask.view()
  }

  /// Converts a flat index to `(y, x)` array coordinates
  #[inline(always)]
  pub fn coords(&self, idx: usize) -> (usize, usize) {
    (idx / self.width(), idx % self.width())
  }

  #[inline(always)]
  pub fn flat(&self, y: usize, x: usize) -> usize {
    x + y * self.width()
  }

  #[inline(always)]
  pub fn is_foreground(&self, idx: usize) -> bool {
    self.mask[self.coords(idx)]
  }

  /// Flat indices of all foreground pixels in row-major order
  pub fn foreground(&self) -> Vec<usize> {
    self
      .mask
      .iter()
      .enumerate()
      .filter_map(|(idx, &fg)| if fg { Some(idx) } else { None })
      .collect()
  }

  pub fn foreground_count(&self) -> usize {
    self.mask.iter().filter(|&&fg| fg).count()
  }

  pub fn background_count(&self) -> usize {
    self.len() - self.foreground_count()
  }

  /// Flat indices of the (up to 8) foreground neighbours of `idx`, in
  /// ascending index order (top-to-bottom, left-to-right).
  pub fn neighbours_8con(&self, idx: usize) -> Vec<usize> {
    let (y, x) = self.coords(idx);
    let (y, x): (isize, isize) = (y as isize, x as isize);
    let (h, w) = (self.height() as isize, self.width() as isize);
    [
      (y - 1, x - 1),
      (y - 1, x),
      (y - 1, x + 1),
      (y, x - 1),
      (y, x + 1),
      (y + 1, x - 1),
      (y + 1, x),
      (y + 1, x + 1),
    ]
    .iter()
    .filter_map(|&(y, x)| {
      if y < 0 || x < 0 || y >= h || x >= w {
        None
      } else {
        Some((y as usize, x as usize))
      }
    })
    .filter(|&idx| self.mask[idx])
    .map(|(y, x)| self.flat(y, x))
    .collect()
  }
}

impl From<nd::Array2<bool>> for PixelGrid {
  fn from(mask: nd::Array2<bool>) -> Self {
    PixelGrid::from_mask(mask)
  }
}
