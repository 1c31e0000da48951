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

use colony_watershed::{filters, prelude::*};

fn solid(height: usize, width: usize, colour: [u8; 3]) -> nd::Array3<u8> {
  nd::Array3::from_shape_fn((height, width, 3), |(_, _, c)| colour[c])
}

fn paint(img: &mut nd::Array3<u8>, y: usize, x: usize, colour: [u8; 3]) {
  img.slice_mut(nd::s![y, x, ..]).assign(&nd::aview1(&colour));
}

#[test]
fn test_threshold() {
  let mut img = solid(4, 4, [0, 0, 0]);
  paint(&mut img, 1, 1, [200, 10, 10]);
  paint(&mut img, 2, 2, [100, 100, 100]);

  let grid = FilterSettings::default().apply(img.view()).unwrap();
  assert_eq!(grid.foreground(), vec![grid.flat(1, 1)]);

  let settings = FilterSettings { threshold: 0.3, ..Default::default() };
  assert_eq!(settings.apply(img.view()).unwrap().foreground_count(), 2);
}

#[test]
fn test_rgb_clamp() {
  let mut img = solid(3, 3, [0, 0, 0]);
  paint(&mut img, 1, 1, [200, 0, 0]);

  let settings = FilterSettings { rgb_clamp: Some([100, 255, 255]), ..Default::default() };
  assert_eq!(settings.apply(img.view()).unwrap().foreground_count(), 0);

  let mut rgb = img.clone();
  filters::clamp_rgb(rgb.view_mut(), [100, 255, 255]);
  assert_eq!(rgb[(1, 1, 0)], 100);
}

#[test]
fn test_greyscale() {
  let mut img = solid(2, 2, [0, 0, 0]);
  paint(&mut img, 0, 0, [255, 0, 0]);

  //Pure red is bright enough on its own, but dark as grey
  assert_eq!(FilterSettings::default().apply(img.view()).unwrap().foreground_count(), 1);
  let settings = FilterSettings { greyscale: true, ..Default::default() };
  assert_eq!(settings.apply(img.view()).unwrap().foreground_count(), 0);

  filters::greyscale(img.view_mut());
  assert_eq!(img.slice(nd::s![0, 0, ..]).to_vec(), vec![76, 76, 76]);
}

#[test]
fn test_dilate() {
  let mut img = solid(5, 5, [0, 0, 0]);
  paint(&mut img, 2, 2, [255, 255, 255]);

  let settings = FilterSettings { dilate: true, ..Default::default() };
  let grid = settings.apply(img.view()).unwrap();
  let expected: Vec<usize> = [(1, 2), (2, 1), (2, 2), (2, 3), (3, 2)]
    .iter()
    .map(|&(y, x)| grid.flat(y, x))
    .collect();
  assert_eq!(grid.foreground(), expected);
}

#[test]
fn test_rgba_input() {
  let mut img = nd::Array3::<u8>::zeros((2, 3, 4));
  img.slice_mut(nd::s![0, 1, ..]).assign(&nd::aview1(&[255u8, 255, 255, 0]));
  let grid = FilterSettings::default().apply(img.view()).unwrap();
  assert_eq!(grid.shape(), (2, 3));
  assert_eq!(grid.foreground(), vec![1]);
}

#[test]
fn test_bad_settings() {
  let img = solid(2, 2, [0, 0, 0]);
  let settings = FilterSettings { threshold: 1.5, ..Default::default() };
  assert_eq!(settings.apply(img.view()).unwrap_err(), CountError::InvalidThreshold(1.5));

  let grey = nd::Array3::<u8>::zeros((2, 2, 1));
  assert_eq!(
    FilterSettings::default().apply(grey.view()).unwrap_err(),
    CountError::InvalidChannels(1)
  );
}

#[test]
fn test_from_threshold() {
  let img = nd::array![[0.0, 0.7, f64::NAN], [f64::INFINITY, 0.5, 0.49]];
  let grid = PixelGrid::from_threshold(img.view(), 0.5);
  assert_eq!(grid.foreground(), vec![1, 4]);
  assert_eq!(grid.background_count(), 4);
}

#[test]
fn test_report() {
  let mut img = solid(12, 24, [0, 0, 0]);
  img.slice_mut(nd::s![2..9, 2..9, ..]).fill(230);
  img.slice_mut(nd::s![2..9, 14..21, ..]).fill(230);
  let settings =
    FilterSettings { rgb_clamp: Some([250, 240, 230]), threshold: 0.6, ..Default::default() };

  let counter = CounterBuilder::new().set_resolution(12).build().unwrap();
  let seg = counter.count(&settings.apply(img.view()).unwrap()).unwrap();
  let mut sections = SectionList::new();
  sections.add(Rect::new(0, 0, 12, 12), Some(&seg));

  let report = Report::new(seg.object_count(), counter.config().resolution(), settings)
    .with_source("plate_01.png")
    .with_sections(&sections);
  let mut out = Vec::new();
  report.write_to(&mut out).unwrap();

  let expected = "Filename:,plate_01.png\n\
    \n\
    Total Count:,2\n\
    \n\
    Section Counts\n\
    Sec_1:,1\n\
    \n\
    Count Settings\n\
    RGB Filter:,true\n\
    RGB Vals:,250-240-230\n\
    Greyscale:,false\n\
    Dilate:,false\n\
    Threshold:,60\n\
    Resolution:,12\n";
  assert_eq!(String::from_utf8(out).unwrap(), expected);
}
