//! Timed slideshow over rendered frames.
//!
//! [`Slideshow`] is the state machine: it starts on frame 1, advances once per
//! tick and stops after the last frame. Where frames go is decided by a
//! [`DisplaySurface`]; [`SlideshowHost`] owns at most one running slideshow
//! and closes it before starting the next.

use crate::SlideshowError;
use image::{imageops::FilterType, RgbImage};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

/// Bounding box frames are scaled into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplaySize {
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
        }
    }
}

/// Scale `image` to fit inside `size`, keeping the aspect ratio.
pub fn fit_to_display(image: &RgbImage, size: DisplaySize) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 || size.width == 0 || size.height == 0 {
        return image.clone();
    }
    let scale = f64::min(
        size.width as f64 / w as f64,
        size.height as f64 / h as f64,
    );
    let nw = ((w as f64 * scale).round() as u32).clamp(1, size.width);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, size.height);
    if (nw, nh) == (w, h) {
        return image.clone();
    }
    image::imageops::resize(image, nw, nh, FilterType::Triangle)
}

/// One frame as handed to a surface.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// 1-based position in the slideshow.
    pub position: usize,
    pub total: usize,
    pub image: &'a RgbImage,
}

impl Frame<'_> {
    /// Window title for this frame: its 1-based index.
    pub fn title(&self) -> String {
        self.position.to_string()
    }
}

/// Frames plus a cursor. Never empty.
#[derive(Clone, Debug)]
pub struct Slideshow {
    frames: Vec<RgbImage>,
    interval: Duration,
    current: usize,
}

impl Slideshow {
    pub fn new(frames: Vec<RgbImage>, interval: Duration) -> Result<Self, SlideshowError> {
        if frames.is_empty() {
            return Err(SlideshowError::EmptySlideshow);
        }
        Ok(Self {
            frames,
            interval,
            current: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn current(&self) -> Frame<'_> {
        Frame {
            position: self.current + 1,
            total: self.frames.len(),
            image: &self.frames[self.current],
        }
    }

    /// True once the last frame is showing.
    pub fn is_finished(&self) -> bool {
        self.current + 1 >= self.frames.len()
    }

    /// Advance to the next frame; `None` once the last frame has been shown.
    pub fn tick(&mut self) -> Option<Frame<'_>> {
        if self.is_finished() {
            return None;
        }
        self.current += 1;
        Some(self.current())
    }
}

/// Somewhere to put slideshow frames.
pub trait DisplaySurface {
    fn show(&mut self, frame: &Frame<'_>) -> Result<(), SlideshowError>;

    /// Release the surface. Further `show` calls may fail.
    fn close(&mut self) -> Result<(), SlideshowError> {
        Ok(())
    }
}

/// Writes each shown frame to `<dir>/frame_<n>.png`, scaled to the display.
#[derive(Debug)]
pub struct DirectorySurface {
    dir: PathBuf,
    size: DisplaySize,
    title: Option<String>,
    written: Vec<PathBuf>,
    closed: bool,
}

impl DirectorySurface {
    /// Create `dir` if needed and remove frames left by an earlier show.
    pub fn create(dir: impl AsRef<Path>, size: DisplaySize) -> Result<Self, SlideshowError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if is_frame_file(&path) {
                fs::remove_file(&path)?;
            }
        }
        Ok(Self {
            dir,
            size,
            title: None,
            written: Vec::new(),
            closed: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Title of the most recently shown frame.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "png")
        && path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.strip_prefix("frame_"))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

impl DisplaySurface for DirectorySurface {
    fn show(&mut self, frame: &Frame<'_>) -> Result<(), SlideshowError> {
        if self.closed {
            return Err(SlideshowError::Closed);
        }
        let path = self.dir.join(format!("frame_{}.png", frame.position));
        fit_to_display(frame.image, self.size).save(&path)?;
        log::info!("frame {}/{} -> {}", frame.position, frame.total, path.display());
        self.title = Some(frame.title());
        self.written.push(path);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SlideshowError> {
        if !self.closed {
            log::debug!("closing surface {}", self.dir.display());
            self.closed = true;
        }
        Ok(())
    }
}

struct Running<S> {
    show: Slideshow,
    surface: S,
}

/// Owns at most one running slideshow.
pub struct SlideshowHost<S: DisplaySurface> {
    open_surface: Box<dyn FnMut() -> Result<S, SlideshowError>>,
    running: Option<Running<S>>,
}

impl<S: DisplaySurface> SlideshowHost<S> {
    /// `open_surface` is called once per started slideshow.
    pub fn new<F>(open_surface: F) -> Self
    where
        F: FnMut() -> Result<S, SlideshowError> + 'static,
    {
        Self {
            open_surface: Box::new(open_surface),
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Surface of the current slideshow, if any.
    pub fn surface(&self) -> Option<&S> {
        self.running.as_ref().map(|r| &r.surface)
    }

    /// Position of the frame currently showing.
    pub fn position(&self) -> Option<usize> {
        self.running.as_ref().map(|r| r.show.current().position)
    }

    /// Close any previous slideshow, then show frame 1 of a new one.
    pub fn start(
        &mut self,
        frames: Vec<RgbImage>,
        interval: Duration,
    ) -> Result<(), SlideshowError> {
        let show = Slideshow::new(frames, interval)?;
        self.close()?;
        let mut surface = (self.open_surface)()?;
        surface.show(&show.current())?;
        self.running = Some(Running { show, surface });
        Ok(())
    }

    /// Show the next frame. Returns `false` when nothing advanced.
    pub fn tick(&mut self) -> Result<bool, SlideshowError> {
        let Some(running) = self.running.as_mut() else {
            return Ok(false);
        };
        match running.show.tick() {
            Some(frame) => {
                running.surface.show(&frame)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Tick until the last frame, sleeping one interval between frames.
    pub fn run_to_end(&mut self) -> Result<(), SlideshowError> {
        loop {
            let interval = match &self.running {
                Some(r) if !r.show.is_finished() => r.show.interval(),
                _ => return Ok(()),
            };
            thread::sleep(interval);
            self.tick()?;
        }
    }

    /// Close the running slideshow, if any.
    pub fn close(&mut self) -> Result<(), SlideshowError> {
        if let Some(mut previous) = self.running.take() {
            previous.surface.close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::{cell::RefCell, rc::Rc};

    fn frames(n: usize) -> Vec<RgbImage> {
        (0..n)
            .map(|i| RgbImage::from_pixel(4, 2, Rgb([i as u8, 0, 0])))
            .collect()
    }

    #[derive(Default)]
    struct Log {
        titles: Vec<String>,
        closes: usize,
        opens: usize,
    }

    struct Recording(Rc<RefCell<Log>>);

    impl DisplaySurface for Recording {
        fn show(&mut self, frame: &Frame<'_>) -> Result<(), SlideshowError> {
            self.0.borrow_mut().titles.push(frame.title());
            Ok(())
        }

        fn close(&mut self) -> Result<(), SlideshowError> {
            self.0.borrow_mut().closes += 1;
            Ok(())
        }
    }

    fn recording_host() -> (SlideshowHost<Recording>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let shared = Rc::clone(&log);
        let host = SlideshowHost::new(move || {
            shared.borrow_mut().opens += 1;
            Ok(Recording(Rc::clone(&shared)))
        });
        (host, log)
    }

    #[test]
    fn ticks_walk_frames_in_order_and_stop() {
        let mut show = Slideshow::new(frames(3), Duration::from_millis(1)).expect("show");
        assert_eq!(show.current().title(), "1");
        assert_eq!(show.tick().map(|f| f.position), Some(2));
        assert_eq!(show.tick().map(|f| f.position), Some(3));
        assert!(show.tick().is_none());
        assert!(show.tick().is_none());
        assert_eq!(show.current().position, 3);
    }

    #[test]
    fn empty_slideshow_is_rejected() {
        assert!(matches!(
            Slideshow::new(Vec::new(), Duration::ZERO),
            Err(SlideshowError::EmptySlideshow)
        ));
    }

    #[test]
    fn single_frame_never_advances() {
        let mut show = Slideshow::new(frames(1), Duration::ZERO).expect("show");
        assert!(show.is_finished());
        assert!(show.tick().is_none());
    }

    #[test]
    fn host_runs_to_the_end_with_titles() {
        let (mut host, log) = recording_host();
        host.start(frames(5), Duration::ZERO).expect("start");
        host.run_to_end().expect("run");
        assert_eq!(log.borrow().titles, ["1", "2", "3", "4", "5"]);
        assert_eq!(host.position(), Some(5));
        assert!(!host.tick().expect("tick"));
    }

    #[test]
    fn starting_again_closes_the_previous_show() {
        let (mut host, log) = recording_host();
        host.start(frames(2), Duration::ZERO).expect("first");
        host.start(frames(3), Duration::ZERO).expect("second");
        {
            let log = log.borrow();
            assert_eq!(log.opens, 2);
            assert_eq!(log.closes, 1);
        }
        assert_eq!(host.position(), Some(1));
        host.close().expect("close");
        assert_eq!(log.borrow().closes, 2);
        assert!(!host.is_running());
    }

    #[test]
    fn empty_start_keeps_the_running_show() {
        let (mut host, log) = recording_host();
        host.start(frames(2), Duration::ZERO).expect("first");
        assert!(host.start(Vec::new(), Duration::ZERO).is_err());
        assert!(host.is_running());
        assert_eq!(log.borrow().closes, 0);
    }

    #[test]
    fn fit_preserves_aspect_ratio() {
        let wide = RgbImage::new(1800, 600);
        assert_eq!(fit_to_display(&wide, DisplaySize::default()).dimensions(), (900, 300));

        let small = RgbImage::new(300, 450);
        assert_eq!(fit_to_display(&small, DisplaySize::default()).dimensions(), (600, 900));
    }

    #[test]
    fn directory_surface_writes_numbered_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("frames");
        let size = DisplaySize {
            width: 8,
            height: 8,
        };
        let mut surface = DirectorySurface::create(&out, size).expect("surface");
        let mut show = Slideshow::new(frames(2), Duration::ZERO).expect("show");
        surface.show(&show.current()).expect("show 1");
        let next = show.tick().expect("frame 2");
        surface.show(&next).expect("show 2");

        assert_eq!(surface.title(), Some("2"));
        assert!(out.join("frame_1.png").is_file());
        let written = image::open(out.join("frame_2.png")).expect("open");
        assert_eq!((written.width(), written.height()), (8, 4));

        surface.close().expect("close");
        assert!(matches!(
            surface.show(&show.current()),
            Err(SlideshowError::Closed)
        ));
    }

    #[test]
    fn new_surface_clears_frames_of_a_longer_show() {
        let dir = tempfile::tempdir().expect("tempdir");
        let size = DisplaySize {
            width: 8,
            height: 8,
        };
        {
            let mut surface = DirectorySurface::create(dir.path(), size).expect("first");
            let mut show = Slideshow::new(frames(3), Duration::ZERO).expect("show");
            surface.show(&show.current()).expect("frame 1");
            while let Some(frame) = show.tick() {
                surface.show(&frame).expect("frame");
            }
        }
        assert!(dir.path().join("frame_3.png").is_file());
        fs::write(dir.path().join("notes.txt"), "keep").expect("notes");
        fs::write(dir.path().join("frame_final.png"), "keep").expect("other png");

        let mut surface = DirectorySurface::create(dir.path(), size).expect("second");
        let show = Slideshow::new(frames(1), Duration::ZERO).expect("show");
        surface.show(&show.current()).expect("frame 1");

        assert!(dir.path().join("frame_1.png").is_file());
        assert!(!dir.path().join("frame_2.png").exists());
        assert!(!dir.path().join("frame_3.png").exists());
        assert!(dir.path().join("notes.txt").is_file());
        assert!(dir.path().join("frame_final.png").is_file());
    }
}
