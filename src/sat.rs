use nanorand::{Rng, WyRand};

#[derive(Clone, Debug)]
pub struct Rect {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// Sum over the `width` x `height` region whose top-left pixel is `(x, y)`,
/// region pixels inclusive.
fn region_sum(
    table: &[u32],
    table_width: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> u32 {
    let right = x + width - 1;
    let bottom = y + height - 1;

    let br = table[bottom * table_width + right];
    let tr = if y > 0 {
        table[(y - 1) * table_width + right]
    } else {
        0
    };
    let bl = if x > 0 {
        table[bottom * table_width + x - 1]
    } else {
        0
    };
    let tl = if x > 0 && y > 0 {
        table[(y - 1) * table_width + x - 1]
    } else {
        0
    };

    br + tl - tr - bl
}

pub fn region_is_empty(
    table: &[u32],
    table_width: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> bool {
    region_sum(table, table_width, x, y, width, height) == 0
}

/// Scans the table for every position where `rect` overlaps nothing and
/// picks one of them uniformly at random via reservoir sampling. `None`
/// means the rect fits nowhere, including when it is larger than the table.
pub fn find_space_for_rect(
    table: &[u32],
    table_width: u32,
    table_height: u32,
    rect: &Rect,
    rng: &mut WyRand,
) -> Option<Point> {
    if rect.width == 0 || rect.height == 0 {
        return None;
    }
    if rect.width > table_width || rect.height > table_height {
        return None;
    }

    let max_x = table_width - rect.width;
    let max_y = table_height - rect.height;

    let mut available_points: u32 = 0;
    let mut chosen = None;

    for y in 0..=max_y {
        for x in 0..=max_x {
            let empty = region_is_empty(
                table,
                table_width as usize,
                x as usize,
                y as usize,
                rect.width as usize,
                rect.height as usize,
            );
            if empty {
                let random_num = rng.generate_range(0..=available_points);
                if random_num == available_points {
                    chosen = Some(Point { x, y });
                }
                available_points += 1;
            }
        }
    }

    chosen
}

/// https://blog.demofox.org/2018/04/16/prefix-sums-and-summed-area-tables/
///
/// Converts raw occupancy values into a summed-area table in place. Rows
/// above `start_row` must already hold summed values; a non-zero
/// `start_row` rebuilds only the rows from there down, which is all that
/// changes after a word is drawn at that height.
pub fn to_summed_area_table(table: &mut [u32], width: usize, start_row: usize) {
    let mut prev_row = vec![0; width];
    if start_row > 0 {
        prev_row.copy_from_slice(&table[(start_row - 1) * width..start_row * width]);
    }

    table
        .chunks_exact_mut(width)
        .skip(start_row)
        .for_each(|row| {
            let mut sum = 0;
            row.iter_mut()
                .zip(prev_row.iter())
                .for_each(|(el, prev_row_el)| {
                    let original_value = *el;
                    *el += sum + prev_row_el;
                    sum += original_value;
                });

            prev_row.copy_from_slice(row)
        });
}
