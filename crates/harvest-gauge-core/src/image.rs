/// Borrowed 8-bit grayscale pixels, row-major, `data.len() == width * height`.
///
/// Integer coordinates address pixel centers.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }
}

#[inline]
fn get_gray(src: &GrayImageView<'_>, x: i64, y: i64) -> u8 {
    if x < 0 || y < 0 || x >= src.width as i64 || y >= src.height as i64 {
        return 0;
    }
    src.data[y as usize * src.width + x as usize]
}

/// Bilinear sample; pixels outside the image read as black.
#[inline]
pub fn sample_bilinear(src: &GrayImageView<'_>, x: f64, y: f64) -> f64 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_gray(src, x0, y0) as f64;
    let p10 = get_gray(src, x0 + 1, y0) as f64;
    let p01 = get_gray(src, x0, y0 + 1) as f64;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f64;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    a + fy * (b - a)
}

#[inline]
pub fn sample_bilinear_u8(src: &GrayImageView<'_>, x: f64, y: f64) -> u8 {
    sample_bilinear(src, x, y).round().clamp(0.0, 255.0) as u8
}
