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

//! Colouring of label buffers for display.
//!
//! Colonies are drawn from a fixed cyclic palette of ten colours, handed out in
//! the order the labels are first met in a row-major scan. The colour of a
//! colony is therefore not stable across recounts.

use ndarray as nd;

/// Colony colours, in the order they are handed out
pub const PALETTE: [[u8; 3]; 10] = [
  [0x00, 0x3D, 0xFF],
  [0xFF, 0x00, 0x00],
  [0xFF, 0xC0, 0x00],
  [0xE0, 0xFF, 0x00],
  [0x7E, 0xFF, 0x00],
  [0x21, 0xFF, 0x00],
  [0x00, 0xFF, 0x41],
  [0x00, 0xFF, 0x9F],
  [0x00, 0xFD, 0xFF],
  [0x00, 0x9F, 0xFF],
];

/// Colour of background pixels
pub const BACKGROUND_COLOUR: [u8; 3] = [0, 0, 0];

/// Palette index of every pixel, `None` for background
pub fn palette_indices(labels: nd::ArrayView2<i32>) -> nd::Array2<Option<usize>> {
  //Colony labels are dense and start at 1, so label - 1 indexes this table
  let mut encountered: Vec<Option<usize>> = Vec::new();
  let mut next = 0usize;
  let mut indices = nd::Array2::<Option<usize>>::from_elem(labels.raw_dim(), None);
  //Both iterators walk the arrays in row-major order
  indices.iter_mut().zip(labels.iter()).filter(|(_, &lbl)| lbl > 0).for_each(|(px, &lbl)| {
    let slot = lbl as usize - 1;
    if slot >= encountered.len() {
      encountered.resize(slot + 1, None);
    }
    let idx = *encountered[slot].get_or_insert_with(|| {
      let idx = next;
      next = (next + 1) % PALETTE.len();
      idx
    });
    *px = Some(idx);
  });
  indices
}

/// Renders a label buffer as an RGB image of shape `(height, width, 3)`
pub fn colourise(labels: nd::ArrayView2<i32>) -> nd::Array3<u8> {
  let (height, width) = labels.dim();
  let indices = palette_indices(labels);
  let mut rgb = nd::Array3::<u8>::zeros((height, width, 3));
  nd::Zip::from(rgb.lanes_mut(nd::Axis(2))).and(&indices).for_each(|mut px, idx| {
    let colour = match idx {
      Some(idx) => PALETTE[*idx],
      None => BACKGROUND_COLOUR,
    };
    px.assign(&nd::aview1(&colour));
  });
  rgb
}
