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

//! Approximate Euclidean distance transform.
//!
//! For every foreground pixel we look for the nearest background pixel by
//! scanning a square window around it. The window starts with a half-width of
//! [`START_RADIUS`] and grows by [`RADIUS_STEP`] until a background pixel shows
//! up. Each growth step only scans the ring that was added, and the search
//! stops at the first ring that contains a background pixel. The closest
//! background pixel within that ring wins, even if a slightly closer one would
//! have been found just outside the window. This is *not* an exact distance
//! transform, and the altitude levels downstream are tuned to it.

use std::ops::RangeInclusive;

use ndarray as nd;
use rayon::prelude::*;

use crate::error::{CountError, CountResult};
use crate::grid::PixelGrid;

/// Half-width of the first search window
pub const START_RADIUS: usize = 5;
/// Amount the window half-width grows by each time nothing was found
pub const RADIUS_STEP: usize = 10;

/// Returns the distance from the foreground pixel at flat index `idx` to the
/// nearest background pixel found by the expanding window search, or `None` if
/// the window grew to cover the whole image without finding any background.
pub fn nearest_background(grid: &PixelGrid, idx: usize) -> Option<f64> {
  let (sy, sx) = grid.coords(idx);
  let (sy, sx) = (sy as isize, sx as isize);
  let (h, w) = (grid.height() as isize, grid.width() as isize);
  let mask = grid.view();

  //Once the window is this large, it contains the whole image
  let limit = h.max(w);

  let mut radius = START_RADIUS as isize;
  let mut scanned: Option<isize> = None;
  loop {
    let mut best: Option<f64> = None;
    for nx in (sx - radius).max(0)..=(sx + radius).min(w - 1) {
      match scanned {
        //Columns through the inner square only add a band above and below it
        Some(prev) if (nx - sx).abs() <= prev => {
          scan_column(&mask, (sy, sx), nx, (sy - radius)..=(sy - prev - 1), &mut best);
          scan_column(&mask, (sy, sx), nx, (sy + prev + 1)..=(sy + radius), &mut best);
        }
        _ => scan_column(&mask, (sy, sx), nx, (sy - radius)..=(sy + radius), &mut best),
      }
    }

    if best.is_some() {
      return best;
    }
    if radius >= limit {
      return None;
    }
    scanned = Some(radius);
    radius += RADIUS_STEP as isize;
  }
}

/// Folds the background pixels of column `nx` within `rows` into `best`
fn scan_column(
  mask: &nd::ArrayView2<bool>,
  (sy, sx): (isize, isize),
  nx: isize,
  rows: RangeInclusive<isize>,
  best: &mut Option<f64>,
) {
  let last_row = mask.nrows() as isize - 1;
  let (lo, hi) = ((*rows.start()).max(0), (*rows.end()).min(last_row));
  for ny in lo..=hi {
    if mask[(ny as usize, nx as usize)] {
      continue;
    }
    let dist = ((nx - sx) as f64).hypot((ny - sy) as f64);
    *best = Some(match *best {
      Some(d) if d <= dist => d,
      _ => dist,
    });
  }
}

/// Computes the distance field of `grid`. The returned array has the same
/// shape as the grid; background entries are `NaN` since the field is only
/// defined on foreground pixels.
///
/// Fails with [`CountError::NoBackground`] if the grid has foreground pixels
/// but no background to measure against. A grid without foreground yields an
/// all-`NaN` field.
pub fn distance_field(grid: &PixelGrid) -> CountResult<nd::Array2<f64>> {
  let foreground = grid.foreground();
  let mut field = nd::Array2::<f64>::from_elem(grid.shape(), f64::NAN);
  if foreground.is_empty() {
    return Ok(field);
  }
  if foreground.len() == grid.len() {
    return Err(CountError::NoBackground);
  }

  #[cfg(feature = "progress")]
  let bar = crate::set_up_bar(foreground.len() as u64, "distance search");

  //Every pixel only reads the grid, so the search parallelises trivially
  let distances: Option<Vec<f64>> = foreground
    .par_iter()
    .map(|&idx| {
      let dist = nearest_background(grid, idx);
      #[cfg(feature = "progress")]
      bar.inc(1);
      dist
    })
    .collect();

  #[cfg(feature = "progress")]
  bar.finish_and_clear();

  let distances = distances.ok_or(CountError::NoBackground)?;
  for (&idx, dist) in foreground.iter().zip(distances) {
    field[grid.coords(idx)] = dist;
  }

  log::trace!("computed distances for {} foreground pixels", foreground.len());
  Ok(field)
}
