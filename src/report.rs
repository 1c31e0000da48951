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

//! Flat key-value record of a count, in the format users paste into
//! spreadsheets.

use std::fmt;
use std::io;

use crate::filters::FilterSettings;
use crate::sections::SectionList;

/// Everything needed to reproduce a count: the result, the sections, and the
/// settings that produced the binary image.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
  source: Option<String>,
  object_count: usize,
  sections: Vec<(String, usize)>,
  settings: FilterSettings,
  resolution: u8,
}

impl Report {
  pub fn new(object_count: usize, resolution: u8, settings: FilterSettings) -> Self {
    Report { source: None, object_count, sections: Vec::new(), settings, resolution }
  }

  /// Name of the image the count was made on
  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }

  /// Snapshot of the section names and their current counts
  pub fn with_sections(mut self, sections: &SectionList) -> Self {
    self.sections = sections.iter().map(|sec| (sec.name().to_string(), sec.count())).collect();
    self
  }

  pub fn object_count(&self) -> usize {
    self.object_count
  }

  pub fn sections(&self) -> &[(String, usize)] {
    &self.sections
  }

  /// Writes the record to `writer`
  pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
    write!(writer, "{self}")?;
    writer.flush()
  }
}

impl fmt::Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Filename:,{}", self.source.as_deref().unwrap_or(""))?;
    writeln!(f, "\nTotal Count:,{}", self.object_count)?;
    writeln!(f, "\nSection Counts")?;
    for (name, count) in &self.sections {
      writeln!(f, "{name}:,{count}")?;
    }

    let s = &self.settings;
    let [r, g, b] = s.rgb_clamp.unwrap_or([u8::MAX; 3]);
    writeln!(f, "\nCount Settings")?;
    writeln!(f, "RGB Filter:,{}", s.rgb_clamp.is_some())?;
    writeln!(f, "RGB Vals:,{r}-{g}-{b}")?;
    writeln!(f, "Greyscale:,{}", s.greyscale)?;
    writeln!(f, "Dilate:,{}", s.dilate)?;
    writeln!(f, "Threshold:,{}", (s.threshold * 100.0).round() as u32)?;
    writeln!(f, "Resolution:,{}", self.resolution)
  }
}
