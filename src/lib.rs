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

#![doc(
  html_logo_url = "https://raw.githubusercontent.com/smups/rustronomy/main/logos/Rustronomy_ferris.png?raw=true"
)]
//! Colony-watershed is a pure-rust colony counter. It counts blobs (bacterial
//! colonies, worms, dots...) in a thresholded image using the pointer-based
//! rainfall watershed algorithm (Bieniek & Moga, 2000[^1]).
//!
//! # How it works
//! The counter takes a binary image (a [`PixelGrid`]) and runs it through a
//! fixed pipeline:
//! 1. every foreground pixel gets its (approximate) distance to the nearest
//! background pixel, see [`distance`].
//! 2. the distances are quantized into a small number of levels and inverted,
//! so the middle of each colony becomes a valley, see [`altitude`].
//! 3. every pixel points downhill until it reaches the bottom of a valley. Each
//! valley is one colony, see [`watershed`].
//! 4. valleys are numbered `1..=N` in the order they are first met, see
//! [`labels`].
//!
//! The resulting [`Segmentation`] holds the label buffer and object count, and
//! can count the colonies inside any rectangle. Named rectangles can be kept
//! in a [`SectionList`](sections::SectionList), which is recounted whenever the
//! segmentation changes.
//!
//! ## Short example: counting two blobs
//! `colony-watershed` uses the "builder pattern" to configure the counter
//! before running it. Create a `CounterBuilder`, set the options you want and
//! call `build()` to get a (`Sync`&`Send`) counter.
//! ```rust
//! use colony_watershed::prelude::*;
//!
//! //Two 7x7 squares on a 24x12 background
//! let mut mask = nd::Array2::<bool>::from_elem((12, 24), false);
//! mask.slice_mut(nd::s![2..9, 2..9]).fill(true);
//! mask.slice_mut(nd::s![2..9, 14..21]).fill(true);
//!
//! let counter = CounterBuilder::new().set_resolution(10).build().unwrap();
//! let seg = counter.count(&PixelGrid::from_mask(mask)).unwrap();
//! assert_eq!(seg.object_count(), 2);
//! assert_eq!(seg.count_region(&Rect::new(0, 0, 12, 12)), 1);
//! ```
//! [^1]: A. Bieniek and A. Moga. **An efficient watershed algorithm based on connected components.** *Pattern Recognition* 33(6), 2000.
//!
//! # Cargo feature gates
//! *By default, all features behind cargo feature gates are **disabled***
//! - `jemalloc`: this feature enables the [jemalloc allocator](https://jemalloc.net).
//! Jemalloc is enabled though usage of the `jemalloc` crate, which increases
//! compile times considerably. To compile `colony-watershed` with the `jemalloc`
//! feature, jemalloc must be installed on the host system.
//! - `plots`: adds the [`plotting`] module, which writes label buffers and
//! altitude maps to png files. Plotting support adds the `plotters` crate as a
//! dependency, which increases compile times and requires the installation of
//! some packages on linux systems, [see the `plotters` documentation for details](https://docs.rs/plotters/).
//! - `progress`: this feature enables a progress bar for the distance search,
//! which is by far the slowest step. Enabling this feature adds the `indicatif`
//! crate as a dependency, which should not considerably slow down compile times.
//! - `debug`: this feature enables performance monitoring output. Timings of
//! each step are sent to the `log` facade at the debug level. Enabling this
//! feature does not add additional dependencies.
//!
//! # Logging
//! The crate logs through the [`log`](https://docs.rs/log) facade and never
//! installs a logger itself.

//Unconditional imports
use ndarray as nd;

//Set Jemalloc as the global allocator for this crate
#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

pub mod altitude;
pub mod distance;
pub mod error;
pub mod filters;
pub mod grid;
pub mod labels;
pub mod palette;
pub mod report;
pub mod sections;
pub mod watershed;

pub use error::{CountError, CountResult};
pub use grid::PixelGrid;

/// Lowest number of distance levels the counter accepts
pub const MIN_RESOLUTION: u8 = 2;
/// Highest number of distance levels the counter accepts
pub const MAX_RESOLUTION: u8 = 25;
/// Number of distance levels used when none is configured
pub const DEFAULT_RESOLUTION: u8 = 10;

//Utility prelude for batch import
pub mod prelude {
  pub use crate::filters::FilterSettings;
  pub use crate::report::Report;
  pub use crate::sections::{Rect, Section, SectionList};
  pub use crate::{ColonyCounter, CountError, CounterBuilder, PixelGrid, Segmentation};
  pub use ndarray as nd;
}

////////////////////////////////////////////////////////////////////////////////
//                              HELPER FUNCTIONS                              //
////////////////////////////////////////////////////////////////////////////////

#[cfg(feature = "progress")]
pub(crate) fn set_up_bar(len: u64, what: &str) -> indicatif::ProgressBar {
  const TEMPLATE: &str = "{spinner}[{elapsed}/{duration}] {msg} {pos}/{len}{bar:60}";
  let bar = indicatif::ProgressBar::new(len);
  if let Ok(style) = indicatif::ProgressStyle::with_template(TEMPLATE) {
    bar.set_style(style);
  }
  bar.set_message(what.to_string());
  bar
}

////////////////////////////////////////////////////////////////////////////////
//                             OPTIONAL MODULES                               //
////////////////////////////////////////////////////////////////////////////////
#[cfg(feature = "debug")]
mod performance_monitoring {

  #[derive(Clone, Debug, Default)]
  pub struct PerfReport {
    pub foreground_px: usize,
    pub distance_ms: usize,
    pub altitude_ms: usize,
    pub watershed_ms: usize,
    pub relabel_ms: usize,
    pub total_ms: usize,
  }

  impl PerfReport {
    pub fn stages_total(&self) -> usize {
      self.distance_ms + self.altitude_ms + self.watershed_ms + self.relabel_ms
    }
  }

  impl std::fmt::Display for PerfReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      writeln!(f, ">---------[Performance Summary]---------")?;
      writeln!(f, ">  Foreground: {}px", self.foreground_px)?;
      writeln!(f, ">  Distance search: {}ms", self.distance_ms)?;
      writeln!(f, ">  Altitude quantization: {}ms", self.altitude_ms)?;
      writeln!(f, ">  Watershed passes: {}ms", self.watershed_ms)?;
      writeln!(f, ">  Relabeling: {}ms", self.relabel_ms)?;
      writeln!(f, ">--------------------------------+ total")?;
      write!(
        f,
        ">  {}ms with {}ms overhead (Δt)",
        self.total_ms,
        self.total_ms.saturating_sub(self.stages_total())
      )
    }
  }
}

#[cfg(feature = "plots")]
/// This module contains the code required to generate images of the label
/// buffer and the altitude map.
pub mod plotting {
  use ndarray as nd;
  use plotters::prelude::*;
  use std::{error::Error, path::Path};

  use crate::altitude::NEVER_FILL;

  //Colour for background px
  const NAN_COL: RGBColor = BLACK;

  /// Draws every pixel of `slice` with the colour `colour_of` picks for it.
  /// Each pixel in the image corresponds 1:1 to an array element.
  pub fn plot_slice<'a, T, F>(
    slice: nd::ArrayView2<'a, T>,
    file_name: &Path,
    colour_of: F,
  ) -> Result<(), Box<dyn Error>>
  where
    F: Fn(&T) -> RGBColor,
  {
    //Arrays are (rows, cols) = (y, x)
    let (y_size, x_size) = slice.dim();

    //Make new fig
    let root = BitMapBackend::new(file_name, (x_size as u32, y_size as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    //fill pixels
    for ((y, x), px) in slice.indexed_iter() {
      root.draw_pixel((x as i32, y as i32), &colour_of(px))?;
    }

    //save file
    root.present()?;
    log::debug!("slice saved as png: {file_name:?}");
    Ok(())
  }

  /// Plots a label buffer with the cyclic colony palette
  pub fn plot_labels(labels: nd::ArrayView2<i32>, file_name: &Path) -> Result<(), Box<dyn Error>> {
    let indices = crate::palette::palette_indices(labels);
    plot_slice(indices.view(), file_name, |idx| match idx {
      Some(idx) => {
        let [r, g, b] = crate::palette::PALETTE[*idx];
        RGBColor(r, g, b)
      }
      None => NAN_COL,
    })
  }

  /// Plots an altitude map in greyscale; background is drawn black
  pub fn plot_altitude(
    altitude: nd::ArrayView2<u8>,
    file_name: &Path,
  ) -> Result<(), Box<dyn Error>> {
    plot_slice(altitude, file_name, |&alt| grey_scale(alt))
  }

  #[inline(always)]
  pub fn grey_scale(alt: u8) -> RGBColor {
    if alt == NEVER_FILL {
      //This is a background pixel, fill it with the NaN colour
      NAN_COL
    } else {
      RGBColor(alt, alt, alt)
    }
  }
}

////////////////////////////////////////////////////////////////////////////////
//                              COLONY COUNTING                               //
////////////////////////////////////////////////////////////////////////////////

/// Settings of a colony counter. Immutable once the counter is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountConfig {
  resolution: u8,
}

impl CountConfig {
  /// Number of distance levels the altitude map is built from
  pub fn resolution(&self) -> u8 {
    self.resolution
  }
}

#[derive(Debug, Clone)]
/// Builder for configuring a colony counter.
///
/// Use `new()` to start configuring, set the options you need, and call
/// `build()` to get a `ColonyCounter`. The counter is `Send + Sync` and can be
/// shared between threads; every call to `count` owns its own buffers.
pub struct CounterBuilder {
  resolution: u8,
}

impl Default for CounterBuilder {
  fn default() -> Self {
    CounterBuilder { resolution: DEFAULT_RESOLUTION }
  }
}

impl CounterBuilder {
  /// creates a new `CounterBuilder` with the default resolution
  pub fn new() -> Self {
    CounterBuilder::default()
  }

  /// Set the number of distance levels (`2..=25`). Fewer levels merge
  /// touching colonies more eagerly, more levels split them more eagerly.
  pub fn set_resolution(mut self, resolution: u8) -> Self {
    self.resolution = resolution;
    self
  }

  /// Build a `ColonyCounter` from the current builder configuration. Returns
  /// an `Err` if the resolution is outside of the supported range.
  pub fn build(self) -> CountResult<ColonyCounter> {
    if !(MIN_RESOLUTION..=MAX_RESOLUTION).contains(&self.resolution) {
      return Err(CountError::InvalidResolution(self.resolution));
    }
    Ok(ColonyCounter { config: CountConfig { resolution: self.resolution } })
  }
}

/// Configured colony counter. See the crate-level docs for an overview of the
/// pipeline.
#[derive(Debug, Clone)]
pub struct ColonyCounter {
  config: CountConfig,
}

impl ColonyCounter {
  pub fn config(&self) -> &CountConfig {
    &self.config
  }

  /// Distance field of `grid`, see [`distance::distance_field`]
  pub fn distance_field(&self, grid: &PixelGrid) -> CountResult<nd::Array2<f64>> {
    distance::distance_field(grid)
  }

  /// Altitude map of `grid` at the configured resolution
  pub fn altitude_map(&self, grid: &PixelGrid) -> CountResult<nd::Array2<u8>> {
    let field = distance::distance_field(grid)?;
    Ok(altitude::altitude_map(field.view(), self.config.resolution))
  }

  /// Runs the full pipeline on `grid`. The whole computation runs to
  /// completion before returning.
  pub fn count(&self, grid: &PixelGrid) -> CountResult<Segmentation> {
    #[cfg(feature = "debug")]
    let mut perf = performance_monitoring::PerfReport::default();
    #[cfg(feature = "debug")]
    let start = std::time::Instant::now();

    let (height, width) = grid.shape();
    log::debug!(
      "counting colonies in {width}x{height} image at resolution {}",
      self.config.resolution
    );

    //(1) distances to the nearest background pixel
    #[cfg(feature = "debug")]
    let stage = std::time::Instant::now();
    let field = distance::distance_field(grid)?;
    #[cfg(feature = "debug")]
    {
      perf.foreground_px = grid.foreground_count();
      perf.distance_ms = stage.elapsed().as_millis() as usize;
    }

    //(2) quantized, inverted altitudes
    #[cfg(feature = "debug")]
    let stage = std::time::Instant::now();
    let altitude = altitude::altitude_map(field.view(), self.config.resolution);
    #[cfg(feature = "debug")]
    {
      perf.altitude_ms = stage.elapsed().as_millis() as usize;
    }

    //(3) pointer forest
    #[cfg(feature = "debug")]
    let stage = std::time::Instant::now();
    let forest = watershed::segment(grid, altitude.view())?;
    #[cfg(feature = "debug")]
    {
      perf.watershed_ms = stage.elapsed().as_millis() as usize;
    }

    //(4) dense labels
    #[cfg(feature = "debug")]
    let stage = std::time::Instant::now();
    let (labels, object_count) = labels::relabel(grid, &forest);
    #[cfg(feature = "debug")]
    {
      perf.relabel_ms = stage.elapsed().as_millis() as usize;
      perf.total_ms = start.elapsed().as_millis() as usize;
      log::debug!("\n{perf}");
    }

    log::debug!("found {object_count} colonies");
    Ok(Segmentation { labels, altitude, object_count })
  }
}

/// Result of a count: one label per pixel plus the number of colonies.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
  labels: nd::Array2<i32>,
  altitude: nd::Array2<u8>,
  object_count: usize,
}

impl Segmentation {
  /// Label buffer: [`labels::BACKGROUND`] (-2) for background, `1..=N` for
  /// colonies
  pub fn labels(&self) -> nd::ArrayView2<i32> {
    self.labels.view()
  }

  /// Altitude map the watershed ran on
  pub fn altitude(&self) -> nd::ArrayView2<u8> {
    self.altitude.view()
  }

  pub fn object_count(&self) -> usize {
    self.object_count
  }

  /// Label of the pixel at `(x, y)`, `None` if it lies outside the image
  pub fn label_at(&self, x: usize, y: usize) -> Option<i32> {
    self.labels.get((y, x)).copied()
  }

  /// Number of distinct colonies inside `rect`
  pub fn count_region(&self, rect: &sections::Rect) -> usize {
    sections::count_region(self.labels.view(), rect)
  }

  /// Area in pixels of every colony. Entry `i` belongs to label `i + 1`.
  pub fn colony_areas(&self) -> Vec<usize> {
    let mut areas = vec![0usize; self.object_count];
    self.labels.iter().filter(|&&lbl| lbl > 0).for_each(|&lbl| areas[lbl as usize - 1] += 1);
    areas
  }

  /// RGB rendering of the label buffer with the colony palette
  pub fn colourise(&self) -> nd::Array3<u8> {
    palette::colourise(self.labels.view())
  }

  pub fn into_labels(self) -> nd::Array2<i32> {
    self.labels
  }
}
