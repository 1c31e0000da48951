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

//! Dense relabeling of watershed basins.

use ndarray as nd;

use crate::grid::PixelGrid;
use crate::watershed::PointerForest;

/// Label of background pixels in the label buffer
pub const BACKGROUND: i32 = -2;
const UNLABELED: i32 = 0;

/// Maps the basin roots of a flattened `forest` onto labels `1..=N`, in the
/// order the roots are first met in a row-major scan. Returns the label buffer
/// (with [`BACKGROUND`] for background pixels) and the object count `N`.
pub fn relabel(grid: &PixelGrid, forest: &PointerForest) -> (nd::Array2<i32>, usize) {
  //Root pixel index -> label. Roots are pixels too, so a flat table will do.
  let mut root_labels = vec![UNLABELED; grid.len()];
  let mut next_label: i32 = 1;

  let mut labels = nd::Array2::<i32>::from_elem(grid.shape(), BACKGROUND);
  labels.iter_mut().zip(grid.view().iter()).enumerate().filter(|(_, (_, &fg))| fg).for_each(
    |(idx, (label, _))| {
      let root = forest.pointer(idx);
      if root_labels[root] == UNLABELED {
        root_labels[root] = next_label;
        next_label += 1;
      }
      *label = root_labels[root];
    },
  );

  let object_count = (next_label - 1) as usize;
  (labels, object_count)
}
