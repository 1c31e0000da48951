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

//! Pre-processing chain that turns a colour photograph into a [`PixelGrid`].
//!
//! The stages always run in the same order: RGB clamp, dilate, greyscale and
//! finally the threshold that decides what is foreground. Only the threshold is
//! mandatory.

use ndarray as nd;

use crate::error::{CountError, CountResult};
use crate::grid::PixelGrid;

/// Settings of the pre-processing chain. These are also reported alongside the
/// counts, so a count can be reproduced later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
  /// Caps each of the red, green and blue channels at the given value
  pub rgb_clamp: Option<[u8; 3]>,
  /// Replace each pixel by the brightest of itself and its 4 neighbours
  pub dilate: bool,
  /// Convert to greyscale before thresholding
  pub greyscale: bool,
  /// Brightness threshold as a fraction of full scale (`0.0..=1.0`)
  pub threshold: f64,
}

impl Default for FilterSettings {
  fn default() -> Self {
    FilterSettings { rgb_clamp: None, dilate: false, greyscale: false, threshold: 0.5 }
  }
}

#[inline(always)]
fn luminance(px: &nd::ArrayView1<u8>) -> u32 {
  77 * px[0] as u32 + 151 * px[1] as u32 + 28 * px[2] as u32
}

impl FilterSettings {
  /// Runs the filter chain over an RGB(A) image of shape
  /// `(height, width, channels)`. The alpha channel, if any, is ignored.
  pub fn apply(&self, img: nd::ArrayView3<u8>) -> CountResult<PixelGrid> {
    if !(0.0..=1.0).contains(&self.threshold) {
      return Err(CountError::InvalidThreshold(self.threshold));
    }
    let channels = img.dim().2;
    if channels != 3 && channels != 4 {
      return Err(CountError::InvalidChannels(channels));
    }

    let mut rgb = img.slice(nd::s![.., .., 0..3]).to_owned();
    if let Some(max) = self.rgb_clamp {
      clamp_rgb(rgb.view_mut(), max);
    }
    if self.dilate {
      rgb = dilate(rgb.view());
    }
    if self.greyscale {
      greyscale(rgb.view_mut());
    }
    Ok(threshold(rgb.view(), self.threshold))
  }
}

/// Caps every channel at the matching entry of `max`
pub fn clamp_rgb(mut rgb: nd::ArrayViewMut3<u8>, max: [u8; 3]) {
  nd::Zip::from(rgb.lanes_mut(nd::Axis(2))).par_for_each(|mut px| {
    px.iter_mut().zip(max.iter()).for_each(|(val, &max)| *val = (*val).min(max));
  });
}

/// Brightest-neighbour dilation over the 4-connected neighbourhood. Ties keep
/// the centre pixel. Pixels on the image edge only consider the neighbours
/// that exist.
pub fn dilate(rgb: nd::ArrayView3<u8>) -> nd::Array3<u8> {
  let (height, width, _) = rgb.dim();
  let mut out = rgb.to_owned();
  nd::Zip::indexed(out.lanes_mut(nd::Axis(2))).par_for_each(|(y, x), mut px| {
    let (y, x) = (y as isize, x as isize);
    let mut brightest = (y as usize, x as usize);
    let mut max_lum = luminance(&rgb.slice(nd::s![y, x, ..]));
    for (ny, nx) in [(y - 1, x), (y, x - 1), (y, x + 1), (y + 1, x)] {
      if ny < 0 || nx < 0 || ny >= height as isize || nx >= width as isize {
        continue;
      }
      let lum = luminance(&rgb.slice(nd::s![ny, nx, ..]));
      if lum > max_lum {
        max_lum = lum;
        brightest = (ny as usize, nx as usize);
      }
    }
    px.assign(&rgb.slice(nd::s![brightest.0, brightest.1, ..]));
  });
  out
}

/// Replaces every channel with the pixel's luminance
pub fn greyscale(mut rgb: nd::ArrayViewMut3<u8>) {
  nd::Zip::from(rgb.lanes_mut(nd::Axis(2))).par_for_each(|mut px| {
    let grey = (luminance(&px.view()) >> 8) as u8;
    px.fill(grey);
  });
}

/// Foreground are the pixels whose brightest channel reaches `level` of full
/// scale
pub fn threshold(rgb: nd::ArrayView3<u8>, level: f64) -> PixelGrid {
  let cutoff = (level * u8::MAX as f64) as u32;
  let mask = nd::Zip::from(rgb.lanes(nd::Axis(2)))
    .par_map_collect(|px| px.iter().map(|&val| val as u32).max().unwrap_or(0) >= cutoff);
  PixelGrid::from_mask(mask)
}
