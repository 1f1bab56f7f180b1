use std::fmt;

use rresource::{AllocError, PmrVec, TrackingResource};

/// A plain three-field record to store in the second array.
struct Point {
  x: i32,
  y: i32,
  z: i32,
}

impl fmt::Display for Point {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "({}, {}, {})", self.x, self.y, self.z)
  }
}

fn main() -> Result<(), AllocError> {
  // Every array below draws its storage from this one resource.
  let mut tracking = TrackingResource::new();

  // --------------------------------------------------------------------
  // 1) An array of integers.
  // --------------------------------------------------------------------
  {
    let mut numbers = PmrVec::new_in(&tracking);
    numbers.push(10)?;
    numbers.push(20)?;
    numbers.push(30)?;

    print!("int vector: ");
    for value in &numbers {
      print!("{} ", value);
    }
    println!();

    println!(
      "[1] live blocks = {}, live bytes = {}",
      tracking.live_blocks(),
      tracking.live_bytes()
    );
  }

  // The integer array is gone and so is its block.
  println!("[1] after drop: live blocks = {}", tracking.live_blocks());

  // --------------------------------------------------------------------
  // 2) An array of records.
  // --------------------------------------------------------------------
  {
    let mut points = PmrVec::new_in(&tracking);
    points.push(Point { x: 1, y: 2, z: 3 })?;
    points.push(Point { x: 4, y: 5, z: 6 })?;
    points.push(Point { x: 7, y: 8, z: 9 })?;

    println!("Point vector:");
    for point in &points {
      println!("{}", point);
    }
  }

  // --------------------------------------------------------------------
  // 3) An array that is never dropped.
  //
  //    Its block stays in the map until the resource itself is dropped.
  // --------------------------------------------------------------------
  let mut leaked = PmrVec::new_in(&tracking);
  leaked.try_extend(0..16u64)?;
  std::mem::forget(leaked);

  println!(
    "[3] forgotten array: live blocks = {}, live bytes = {}",
    tracking.live_blocks(),
    tracking.live_bytes()
  );

  let reclaimed = tracking.release_all();
  println!(
    "[3] reclaimed {} block(s), live blocks = {}",
    reclaimed,
    tracking.live_blocks()
  );

  drop(tracking);
  println!("TrackingResource dropped.");

  Ok(())
}
