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

use colony_watershed::prelude::*;

fn disks(width: usize, height: usize, disks: &[(isize, isize, isize)]) -> PixelGrid {
  let mask = nd::Array2::from_shape_fn((height, width), |(y, x)| {
    let (x, y) = (x as isize, y as isize);
    disks.iter().any(|&(cx, cy, r)| (x - cx).pow(2) + (y - cy).pow(2) <= r * r)
  });
  PixelGrid::from_mask(mask)
}

//4x3 grid of disks, labelled 1..=12 row by row
fn twelve_colonies() -> Segmentation {
  let centres: Vec<(isize, isize, isize)> =
    (0..3).flat_map(|j| (0..4).map(move |i| (15 + 25 * i, 15 + 25 * j, 6))).collect();
  let counter = CounterBuilder::new().build().unwrap();
  counter.count(&disks(100, 80, &centres)).unwrap()
}

#[test]
fn test_count_region() {
  let seg = twelve_colonies();
  assert_eq!(seg.object_count(), 12);
  assert_eq!(seg.count_region(&Rect::new(0, 0, 50, 80)), 6);
  assert_eq!(seg.count_region(&Rect::new(0, 0, 100, 40)), 8);
  assert_eq!(seg.count_region(&Rect::new(0, 0, 22, 22)), 1);
}

#[test]
fn test_region_inside_one_colony() {
  let seg = twelve_colonies();
  assert_eq!(seg.count_region(&Rect::new(12, 12, 18, 18)), 1);
}

#[test]
fn test_region_corners_in_any_order() {
  let seg = twelve_colonies();
  let expected = seg.count_region(&Rect::new(0, 0, 50, 80));
  assert_eq!(seg.count_region(&Rect::new(50, 80, 0, 0)), expected);
  assert_eq!(seg.count_region(&Rect::new(0, 80, 50, 0)), expected);
}

#[test]
fn test_region_is_clamped() {
  let seg = twelve_colonies();
  assert_eq!(seg.count_region(&Rect::new(-20, -20, 500, 500)), 12);
  assert_eq!(seg.count_region(&Rect::new(-50, -50, -10, -10)), 0);
  assert_eq!(seg.count_region(&Rect::new(200, 10, 300, 60)), 0);
}

#[test]
fn test_region_with_extreme_corners() {
  let seg = twelve_colonies();
  assert_eq!(seg.count_region(&Rect::new(isize::MIN, 0, isize::MAX, 0)), 0);
  assert_eq!(seg.count_region(&Rect::new(isize::MIN, isize::MIN, isize::MAX, isize::MAX)), 12);
  assert_eq!(Rect::new(isize::MIN, 0, isize::MAX, 0).area(), 0);
  assert_eq!(Rect::new(isize::MIN, 0, isize::MAX, 2).area(), usize::MAX);
  assert_eq!(Rect::new(4, -3, -2, 5).area(), 48);
}

#[test]
fn test_zero_area_region() {
  let seg = twelve_colonies();
  assert_eq!(seg.count_region(&Rect::new(30, 30, 30, 60)), 0);
  assert_eq!(seg.count_region(&Rect::new(15, 15, 15, 15)), 0);
}

#[test]
fn test_rect_from_window() {
  //A 100x80 image centred in a 120x100 window is offset by (10, 10)
  let rect = Rect::from_window(Rect::new(10, 10, 60, 90), (120, 100), (100, 80));
  assert_eq!(rect, Rect::new(0, 0, 50, 80));
  assert_eq!(rect.area(), 50 * 80);
}

#[test]
fn test_section_names_and_counts() {
  let seg = twelve_colonies();
  let mut sections = SectionList::new();
  assert!(sections.is_empty());

  let first = sections.add(Rect::new(0, 0, 50, 80), Some(&seg));
  assert_eq!(first.name(), "Sec_1");
  assert_eq!(first.count(), 6);

  //Sections drawn before counting start out at zero
  sections.add(Rect::new(0, 0, 100, 40), None);
  sections.add_named("corner", Rect::new(0, 0, 22, 22), None);
  assert_eq!(sections.get("Sec_2").unwrap().count(), 0);
  assert_eq!(sections.len(), 3);

  sections.recount(&seg);
  let counts: Vec<(&str, usize)> = sections.iter().map(|sec| (sec.name(), sec.count())).collect();
  assert_eq!(counts, vec![("Sec_1", 6), ("Sec_2", 8), ("corner", 1)]);
}

#[test]
fn test_section_order_does_not_matter() {
  let seg = twelve_colonies();
  let rects = [Rect::new(0, 0, 50, 80), Rect::new(0, 0, 100, 40), Rect::new(12, 12, 18, 18)];

  let mut forward = SectionList::new();
  rects.iter().for_each(|&rect| {
    forward.add(rect, Some(&seg));
  });
  let mut backward = SectionList::new();
  rects.iter().rev().for_each(|&rect| {
    backward.add(rect, Some(&seg));
  });

  for sec in &forward {
    let other = backward.iter().find(|other| other.rect() == sec.rect()).unwrap();
    assert_eq!(sec.count(), other.count());
  }

  //Recounting the same segmentation changes nothing
  let before: Vec<usize> = forward.iter().map(Section::count).collect();
  forward.recount(&seg);
  let after: Vec<usize> = forward.iter().map(Section::count).collect();
  assert_eq!(before, after);
}

#[test]
fn test_reset_and_clear_sections() {
  let seg = twelve_colonies();
  let mut sections = SectionList::new();
  sections.add(Rect::new(0, 0, 50, 80), Some(&seg));
  sections.add(Rect::new(0, 0, 100, 40), Some(&seg));

  sections.reset_counts();
  assert_eq!(sections.len(), 2);
  assert!(sections.iter().all(|sec| sec.count() == 0));

  sections.clear();
  assert!(sections.is_empty());
  //Numbering starts over after a full wipe
  assert_eq!(sections.add(Rect::default(), None).name(), "Sec_1");
}

#[test]
fn test_recount_after_new_segmentation() {
  let mut sections = SectionList::new();
  sections.add(Rect::new(0, 0, 100, 80), Some(&twelve_colonies()));
  assert_eq!(sections.get("Sec_1").unwrap().count(), 12);

  //Same image with the bottom row of colonies gone
  let centres: Vec<(isize, isize, isize)> =
    (0..2).flat_map(|j| (0..4).map(move |i| (15 + 25 * i, 15 + 25 * j, 6))).collect();
  let counter = CounterBuilder::new().build().unwrap();
  let seg = counter.count(&disks(100, 80, &centres)).unwrap();
  sections.recount(&seg);
  assert_eq!(sections.get("Sec_1").unwrap().count(), 8);
}
