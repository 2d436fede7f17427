use colortally::{to_csv, ColorCounts, SortOrder};

fn main() {
    let path = std::env::args().nth(1).expect("usage: colortally <image>");

    let image = colortally::image::open(path).unwrap().to_rgba8();
    let counts = ColorCounts::from_image(image).generate().unwrap();

    print!("{}", to_csv(&counts, SortOrder::CountDesc));
}
