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

//! Quantization of the distance field into watershed altitudes.

use ndarray as nd;
use num_traits::ToPrimitive;

/// Highest altitude a foreground pixel can get (the rim of a colony)
pub const NORMAL_MAX: u8 = u8::MAX - 1;
/// Altitude of background pixels. Nothing ever flows into the sea.
pub const NEVER_FILL: u8 = u8::MAX;

/// Linear map of `val` from `[lo, hi]` onto `[from, to]`. A zero-width input
/// range collapses onto the lowest end of the target range instead of
/// dividing by zero.
#[inline]
fn rescale(val: f64, lo: f64, hi: f64, from: f64, to: f64) -> f64 {
  let range = hi - lo;
  if range == 0.0 {
    from.min(to)
  } else {
    from + (to - from) * (val - lo) / range
  }
}

/// Min and max of all non-NaN values, `None` if there are none
fn min_max<'a, I>(vals: I) -> Option<(f64, f64)>
where
  I: IntoIterator<Item = &'a f64>,
{
  vals.into_iter().filter(|val| !val.is_nan()).fold(None, |acc, &val| match acc {
    None => Some((val, val)),
    Some((lo, hi)) => Some((lo.min(val), hi.max(val))),
  })
}

/// Turns a distance field (`NaN` on background) into an altitude map.
///
/// The distances are first bucketed into `resolution` levels (`0..=resolution`),
/// and the levels are then spread out over the inverted range `254..=0`. Pixels
/// deep inside a colony end up near 0 and form the minima the watershed grows
/// basins from. Pixels on the rim end up near 254, and background pixels are
/// set to [`NEVER_FILL`].
pub fn altitude_map(field: nd::ArrayView2<f64>, resolution: u8) -> nd::Array2<u8> {
  //(1) bucket raw distances into discrete levels
  let levels = match min_max(field.iter()) {
    Some((lo, hi)) => field.mapv(|dist| {
      if dist.is_nan() {
        f64::NAN
      } else {
        rescale(dist, lo, hi, 0.0, resolution as f64).round()
      }
    }),
    None => return nd::Array2::from_elem(field.raw_dim(), NEVER_FILL),
  };

  //(2) spread levels over the inverted altitude range
  let (lo, hi) = match min_max(levels.iter()) {
    Some(bounds) => bounds,
    None => return nd::Array2::from_elem(field.raw_dim(), NEVER_FILL),
  };
  log::trace!("distance levels span {lo}..={hi} (resolution {resolution})");

  //(3) background is the sea
  levels.mapv(|lvl| {
    if lvl.is_nan() {
      NEVER_FILL
    } else {
      rescale(lvl, lo, hi, NORMAL_MAX as f64, 0.0).round().to_u8().unwrap_or(NORMAL_MAX)
    }
  })
}
