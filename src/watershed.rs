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

//! Pointer-based rainfall watershed (Bieniek & Moga, 2000[^1]).
//!
//! Rather than flooding basins from seeds, every pixel gets a pointer to the
//! neighbour a raindrop falling on it would roll towards. Following the
//! pointers from any pixel ends at the bottom of its catchment basin. The
//! pointers are stored in a flat [`PointerForest`] that doubles as a union-find
//! structure for merging flat minima.
//!
//! The forest is built in four passes that must run in order:
//! 1. *steepest descent*: point each pixel at its lowest, strictly lower
//!    neighbour. Pixels without one are marked unresolved.
//! 2. *plateau flooding*: unresolved pixels that border an equal-altitude pixel
//!    which *does* drain somewhere are chained towards that exit, breadth first.
//! 3. *minimum rooting*: whatever is still unresolved lies on a minimal plateau.
//!    Such pixels become roots and are merged with equal-altitude neighbours.
//! 4. *flattening*: every pixel is pointed straight at its root.
//!
//! [^1]: A. Bieniek and A. Moga. **An efficient watershed algorithm based on
//! connected components.** *Pattern Recognition* 33(6), 2000.

use std::collections::VecDeque;

use ndarray as nd;

use crate::error::{CountError, CountResult};
use crate::grid::PixelGrid;

/// Pointer value of pixels that sit on a plateau we have not resolved yet
pub const UNRESOLVED: usize = usize::MAX;

/// Flat array of "flows toward" pointers, one entry per pixel. Roots point to
/// themselves. Entries of background pixels are never read and stay
/// [`UNRESOLVED`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerForest {
  pointers: Vec<usize>,
}

impl PointerForest {
  fn new(len: usize) -> Self {
    PointerForest { pointers: vec![UNRESOLVED; len] }
  }

  /// Current pointer of the pixel at flat index `idx`
  #[inline(always)]
  pub fn pointer(&self, idx: usize) -> usize {
    self.pointers[idx]
  }

  pub fn as_slice(&self) -> &[usize] {
    &self.pointers
  }

  pub fn len(&self) -> usize {
    self.pointers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pointers.is_empty()
  }

  /// Returns the root of `u` and redirects every pixel on the way there
  /// straight to that root.
  pub fn find(&mut self, u: usize) -> usize {
    let mut root = u;
    while self.pointers[root] != root {
      root = self.pointers[root];
    }

    //Path compression
    let mut walker = u;
    while walker != root {
      let next = self.pointers[walker];
      self.pointers[walker] = root;
      walker = next;
    }
    root
  }

  /// Merges the trees of `a` and `b`; the smaller root index wins
  fn union_min(&mut self, a: usize, b: usize) {
    let (ra, rb) = (self.find(a), self.find(b));
    let min = ra.min(rb);
    self.pointers[ra] = min;
    self.pointers[rb] = min;
  }
}

/// Runs the four watershed passes over the foreground of `grid`, using
/// `altitude` as the topographic surface. Every foreground pixel of the
/// returned forest points straight at its root.
pub fn segment(grid: &PixelGrid, altitude: nd::ArrayView2<u8>) -> CountResult<PointerForest> {
  let mut forest = drainage(grid, altitude)?;
  flatten(&grid.foreground(), &mut forest);
  Ok(forest)
}

/// Runs the first three watershed passes only. Each foreground pixel points
/// one step downhill, or one step along its plateau towards the exit, and the
/// roots of minima point at themselves. Use [`PointerForest::find`] to follow
/// a pixel down to its root.
pub fn drainage(grid: &PixelGrid, altitude: nd::ArrayView2<u8>) -> CountResult<PointerForest> {
  if altitude.dim() != grid.shape() {
    return Err(CountError::ShapeMismatch { expected: grid.shape(), actual: altitude.dim() });
  }

  //Logical iteration order equals flat index order
  let alt: Vec<u8> = altitude.iter().copied().collect();
  let foreground = grid.foreground();
  let mut forest = PointerForest::new(grid.len());

  steepest_descent(grid, &alt, &foreground, &mut forest);
  flood_plateaus(grid, &alt, &foreground, &mut forest);
  root_minima(grid, &alt, &foreground, &mut forest);

  Ok(forest)
}

fn steepest_descent(
  grid: &PixelGrid,
  alt: &[u8],
  foreground: &[usize],
  forest: &mut PointerForest,
) {
  let mut plateau_px = 0usize;
  for &p in foreground {
    let mut lowest = p;
    for n in grid.neighbours_8con(p) {
      //Strictly lower than both p and the best so far: ties keep the first
      if alt[n] < alt[p] && alt[n] < alt[lowest] {
        lowest = n;
      }
    }
    if lowest != p {
      forest.pointers[p] = lowest;
    } else {
      forest.pointers[p] = UNRESOLVED;
      plateau_px += 1;
    }
  }
  log::trace!("steepest descent left {plateau_px} plateau pixels");
}

fn flood_plateaus(
  grid: &PixelGrid,
  alt: &[u8],
  foreground: &[usize],
  forest: &mut PointerForest,
) {
  /*
    Seed the queue with plateau exits: for each unresolved pixel, the first
    neighbour of the same altitude that already drains somewhere. Popping an
    exit hands its pointer to all unresolved equal-altitude neighbours, which
    then act as exits for the rest of the plateau.
  */
  let mut fifo: VecDeque<usize> = foreground
    .iter()
    .filter(|&&p| forest.pointers[p] == UNRESOLVED)
    .filter_map(|&p| {
      grid
        .neighbours_8con(p)
        .into_iter()
        .find(|&n| forest.pointers[n] != UNRESOLVED && alt[n] == alt[p])
    })
    .collect();

  let mut resolved = 0usize;
  while let Some(exit) = fifo.pop_front() {
    for n in grid.neighbours_8con(exit) {
      if forest.pointers[n] == UNRESOLVED && alt[n] == alt[exit] {
        forest.pointers[n] = exit;
        fifo.push_back(n);
        resolved += 1;
      }
    }
  }
  log::trace!("plateau flooding resolved {resolved} pixels");
}

fn root_minima(
  grid: &PixelGrid,
  alt: &[u8],
  foreground: &[usize],
  forest: &mut PointerForest,
) {
  //Ascending scan: lower-index neighbours on the same minimum are rooted already
  for &p in foreground {
    if forest.pointers[p] != UNRESOLVED {
      continue;
    }
    forest.pointers[p] = p;
    for n in grid.neighbours_8con(p) {
      if n < p && alt[n] == alt[p] {
        forest.union_min(p, n);
      }
    }
  }
}

fn flatten(foreground: &[usize], forest: &mut PointerForest) {
  for &p in foreground {
    forest.pointers[p] = forest.find(p);
  }
}
