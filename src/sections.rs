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

//! Rectangular sections of an image and the number of colonies inside them.

use std::ops::Range;

use ndarray as nd;
use rayon::prelude::*;

use crate::labels::BACKGROUND;
use crate::Segmentation;

/// Axis-aligned rectangle in image pixel coordinates. The corners may be given
/// in any order and may lie outside the image; both are sorted out when the
/// rectangle is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
  pub x1: isize,
  pub y1: isize,
  pub x2: isize,
  pub y2: isize,
}

impl Rect {
  pub fn new(x1: isize, y1: isize, x2: isize, y2: isize) -> Self {
    Rect { x1, y1, x2, y2 }
  }

  /// Translates a rectangle drawn in window coordinates to image coordinates,
  /// for an image of `image_size` (width, height) drawn centred in a window of
  /// `window_size`.
  pub fn from_window(
    window_rect: Rect,
    window_size: (usize, usize),
    image_size: (usize, usize),
  ) -> Self {
    let dx = (window_size.0 as isize - image_size.0 as isize) / 2;
    let dy = (window_size.1 as isize - image_size.1 as isize) / 2;
    Rect {
      x1: window_rect.x1 - dx,
      y1: window_rect.y1 - dy,
      x2: window_rect.x2 - dx,
      y2: window_rect.y2 - dy,
    }
  }

  /// Half-open column and row ranges covered by this rectangle, clamped to an
  /// image of the given size.
  pub fn clamp_to(&self, width: usize, height: usize) -> (Range<usize>, Range<usize>) {
    let clamp = |a: isize, b: isize, max: usize| -> Range<usize> {
      let lo = a.min(b).clamp(0, max as isize) as usize;
      let hi = a.max(b).clamp(0, max as isize) as usize;
      lo..hi
    };
    (clamp(self.x1, self.x2, width), clamp(self.y1, self.y2, height))
  }

  pub fn area(&self) -> usize {
    self.x1.abs_diff(self.x2).saturating_mul(self.y1.abs_diff(self.y2))
  }
}

impl From<(isize, isize, isize, isize)> for Rect {
  fn from((x1, y1, x2, y2): (isize, isize, isize, isize)) -> Self {
    Rect::new(x1, y1, x2, y2)
  }
}

/// Counts the distinct colonies (non-background labels) that have at least one
/// pixel inside `rect`.
pub fn count_region(labels: nd::ArrayView2<i32>, rect: &Rect) -> usize {
  let (height, width) = labels.dim();
  let (cols, rows) = rect.clamp_to(width, height);
  if cols.is_empty() || rows.is_empty() {
    if rect.area() > 0 {
      log::warn!("section {rect:?} lies outside the {width}x{height} image");
    }
    return 0;
  }

  let mut seen: Vec<i32> =
    labels.slice(nd::s![rows, cols]).iter().copied().filter(|&lbl| lbl != BACKGROUND).collect();
  seen.sort_unstable();
  seen.dedup();
  seen.len()
}

/// A named rectangle together with the number of colonies last counted in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
  name: String,
  rect: Rect,
  count: usize,
}

impl Section {
  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn rect(&self) -> Rect {
    self.rect
  }

  /// Count as of the last (re)count, 0 if it has not been counted yet
  pub fn count(&self) -> usize {
    self.count
  }
}

/// All the sections a user has drawn, in the order they were created.
/// Sections survive recounts; call [`SectionList::recount`] whenever the
/// segmentation changes.
#[derive(Debug, Clone, Default)]
pub struct SectionList {
  sections: Vec<Section>,
}

impl SectionList {
  pub fn new() -> Self {
    SectionList::default()
  }

  /// Adds a section named `Sec_<n>`, where `n` is its position in the list
  /// (starting at 1). If a segmentation is supplied, the section is counted
  /// straight away.
  pub fn add(&mut self, rect: Rect, segmentation: Option<&Segmentation>) -> &Section {
    let name = format!("Sec_{}", self.sections.len() + 1);
    self.add_named(name, rect, segmentation)
  }

  /// Adds a section with a custom name
  pub fn add_named(
    &mut self,
    name: impl Into<String>,
    rect: Rect,
    segmentation: Option<&Segmentation>,
  ) -> &Section {
    let count = segmentation.map(|seg| seg.count_region(&rect)).unwrap_or(0);
    self.sections.push(Section { name: name.into(), rect, count });
    &self.sections[self.sections.len() - 1]
  }

  /// Recounts every section against a new segmentation
  pub fn recount(&mut self, segmentation: &Segmentation) {
    //Read-only over the labels, so every section can go at once
    self.sections.par_iter_mut().for_each(|sec| sec.count = segmentation.count_region(&sec.rect));
  }

  /// Zeroes all counts but keeps the sections themselves
  pub fn reset_counts(&mut self) {
    self.sections.iter_mut().for_each(|sec| sec.count = 0);
  }

  /// Removes all sections
  pub fn clear(&mut self) {
    self.sections.clear();
  }

  pub fn get(&self, name: &str) -> Option<&Section> {
    self.sections.iter().find(|sec| sec.name == name)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, Section> {
    self.sections.iter()
  }

  pub fn len(&self) -> usize {
    self.sections.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sections.is_empty()
  }
}

impl<'a> IntoIterator for &'a SectionList {
  type Item = &'a Section;
  type IntoIter = std::slice::Iter<'a, Section>;

  fn into_iter(self) -> Self::IntoIter {
    self.sections.iter()
  }
}
