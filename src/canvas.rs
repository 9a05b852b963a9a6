//! Single-writer RGB565 framebuffer.
//!
//! All drawing targets this RAM buffer; display devices copy the finished
//! buffer out in one pass. Drawing is only possible through a [`Frame`],
//! obtained from [`Canvas::begin_frame`], which clears the buffer and holds
//! the canvas mutably borrowed until [`Frame::finish`]. A second frame
//! cannot be opened while one is alive, so nested frame construction does
//! not compile.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use kleine_common::BLACK;

pub struct Canvas {
    pixels: Vec<Rgb565>,
    size: Size,
    frames: u64,
}

impl Canvas {
    /// Allocate a black canvas of `size` pixels.
    pub fn new(size: Size) -> Self {
        let count = size.width as usize * size.height as usize;
        Self {
            pixels: vec![BLACK; count],
            size,
            frames: 0,
        }
    }

    pub const fn size(&self) -> Size {
        self.size
    }

    /// Number of frames finished so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Clear the surface and open it for drawing.
    pub fn begin_frame(&mut self) -> Frame<'_> {
        self.pixels.fill(BLACK);
        Frame { canvas: self }
    }

    /// Color at `point`, or `None` outside the canvas.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index(point.x, point.y).map(|idx| self.pixels[idx])
    }

    /// Row-major pixel data.
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Copy the whole canvas onto another draw target in a single
    /// `fill_contiguous` call.
    pub fn copy_to<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let area = Rectangle::new(Point::zero(), self.size);
        target.fill_contiguous(&area, self.pixels.iter().copied())
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (w, h) = (self.size.width as i32, self.size.height as i32);
        if x >= 0 && y >= 0 && x < w && y < h {
            Some(y as usize * self.size.width as usize + x as usize)
        } else {
            None
        }
    }
}

/// The open drawing handle for one frame.
pub struct Frame<'a> {
    canvas: &'a mut Canvas,
}

impl<'a> Frame<'a> {
    /// Close the frame and hand back the finished canvas for flushing.
    pub fn finish(self) -> &'a Canvas {
        self.canvas.frames += 1;
        self.canvas
    }
}

impl OriginDimensions for Frame<'_> {
    fn size(&self) -> Size {
        self.canvas.size
    }
}

impl DrawTarget for Frame<'_> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if let Some(idx) = self.canvas.index(coord.x, coord.y) {
                self.canvas.pixels[idx] = color;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        let mut colors = colors.into_iter();
        for row in 0..area.size.height as i32 {
            for col in 0..area.size.width as i32 {
                let Some(color) = colors.next() else {
                    return Ok(());
                };
                if let Some(idx) = self.canvas.index(area.top_left.x + col, area.top_left.y + row) {
                    self.canvas.pixels[idx] = color;
                }
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let clipped = area.intersection(&Rectangle::new(Point::zero(), self.canvas.size));
        let Some(bottom_right) = clipped.bottom_right() else {
            return Ok(());
        };
        let width = self.canvas.size.width as usize;
        for y in clipped.top_left.y..=bottom_right.y {
            let start = y as usize * width + clipped.top_left.x as usize;
            let end = y as usize * width + bottom_right.x as usize + 1;
            self.canvas.pixels[start..end].fill(color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::PrimitiveStyle;
    use kleine_common::{RED, WHITE};

    #[test]
    fn test_begin_frame_clears() {
        let mut canvas = Canvas::new(Size::new(8, 4));
        {
            let mut frame = canvas.begin_frame();
            frame.clear(WHITE).unwrap();
            frame.finish();
        }
        assert_eq!(canvas.pixel(Point::new(3, 2)), Some(WHITE));
        canvas.begin_frame().finish();
        assert_eq!(canvas.pixel(Point::new(3, 2)), Some(BLACK));
        assert_eq!(canvas.frames(), 2);
    }

    #[test]
    fn test_fill_solid_is_clipped() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        let mut frame = canvas.begin_frame();
        Rectangle::new(Point::new(-5, 7), Size::new(8, 20))
            .into_styled(PrimitiveStyle::with_fill(RED))
            .draw(&mut frame)
            .unwrap();
        let canvas = frame.finish();
        assert_eq!(canvas.pixel(Point::new(0, 9)), Some(RED));
        assert_eq!(canvas.pixel(Point::new(2, 7)), Some(RED));
        assert_eq!(canvas.pixel(Point::new(3, 7)), Some(BLACK));
        assert_eq!(canvas.pixel(Point::new(0, 6)), Some(BLACK));
    }

    #[test]
    fn test_out_of_bounds_pixels_are_dropped() {
        let mut canvas = Canvas::new(Size::new(4, 4));
        let mut frame = canvas.begin_frame();
        frame
            .draw_iter([Pixel(Point::new(-1, 0), RED), Pixel(Point::new(4, 4), RED), Pixel(Point::new(1, 1), RED)])
            .unwrap();
        let canvas = frame.finish();
        assert_eq!(canvas.pixels().iter().filter(|c| **c == RED).count(), 1);
        assert_eq!(canvas.pixel(Point::new(4, 4)), None);
    }

    #[test]
    fn test_copy_to_matches_pixels() {
        let mut canvas = Canvas::new(Size::new(6, 3));
        let mut frame = canvas.begin_frame();
        Pixel(Point::new(5, 2), WHITE).draw(&mut frame).unwrap();
        let source = frame.finish();

        let mut target = Canvas::new(Size::new(6, 3));
        let mut target_frame = target.begin_frame();
        source.copy_to(&mut target_frame).unwrap();
        let copied = target_frame.finish();
        assert_eq!(copied.pixels(), source.pixels());
    }
}
