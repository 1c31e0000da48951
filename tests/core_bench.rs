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
use ndarray_rand::{rand_distr::Uniform, RandomExt};

#[test]
fn core_bench() {
  //Create a random uniform distribution and threshold it
  let rf = nd::Array2::<u8>::random((512, 512), Uniform::new(0, 254));
  let grid = PixelGrid::from_threshold(rf.view(), 160.0);

  //Set-up the counter
  let counter = CounterBuilder::new().build().unwrap();

  println!("Testing 1 to {} threads performance", rayon::current_num_threads());

  //Time with num cores
  let results: Vec<(f64, usize)> = (1..=rayon::current_num_threads())
    .map(|num_threads| {
      //Set core count
      println!("Running counter with {num_threads} thread(s)");
      let pool = rayon::ThreadPoolBuilder::new().num_threads(num_threads).build().unwrap();
      //Time count
      let start = std::time::Instant::now();
      let seg = pool.install(|| counter.count(&grid).unwrap());
      (start.elapsed().as_secs_f64(), seg.object_count())
    })
    .collect();

  //Print per run results
  for (threads, (time, _)) in results.iter().enumerate().map(|(i, t)| (i + 1, t)) {
    println!("{threads:02} threads = {time:000.02}s");
  }

  //Every thread count must agree on the result
  assert!(results.windows(2).all(|pair| pair[0].1 == pair[1].1));

  //Print total results
  let average = (1.0 / (results.len() as f64)) * results.iter().map(|(t, _)| t).sum::<f64>();
  println!("Average time: {average:.02}");
}
