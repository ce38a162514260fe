use std::future::Future;
use std::sync::Arc;

use crate::config::{Config, REFRESH_EVERY, TICK};
use crate::display::framebuffer::Framebuffer;
use crate::display::Display;
use crate::error::{DisplayError, RefreshError, StartupError};
use crate::frame::{self, InfoFrame};
use crate::image::{Composer, Fonts};
use crate::input::{Exit, Keyboard};
use crate::render::RenderLoop;
use crate::scheduler::{FrameHandle, Refresh, RefreshScheduler};
use crate::sources::{Gather, Sources};

/// One refresh cycle: query every source, then compose on the blocking pool.
pub struct InfoRefresher<G = Sources> {
    sources: G,
    composer: Arc<Composer>,
}

impl<G: Gather> InfoRefresher<G> {
    pub fn new(sources: G, composer: Arc<Composer>) -> Self {
        Self { sources, composer }
    }
}

impl<G: Gather> Refresh for InfoRefresher<G> {
    fn refresh(&self) -> impl Future<Output = Result<InfoFrame, RefreshError>> + Send {
        async move {
            let readings = self.sources.gather().await;
            let composer = Arc::clone(&self.composer);
            let frame =
                tokio::task::spawn_blocking(move || composer.compose_info(&readings)).await??;
            Ok(frame)
        }
    }
}

/// Everything the kiosk shares between its render loop and its refresh cycles.
pub struct Kiosk {
    config: Config,
    composer: Arc<Composer>,
    refresher: Arc<InfoRefresher>,
    frame: Arc<FrameHandle>,
}

impl Kiosk {
    /// Load assets and compose the first info frame. Blocks until every source has answered
    /// or timed out, so the first frame shown is never blank.
    pub async fn start(config: Config) -> Result<Self, StartupError> {
        let background = frame::load_background(&config.background_path())?;
        let fonts = Fonts::resolve()?;
        let composer = Arc::new(Composer::new(background, fonts));

        let sources = Sources::new(config.service_key.clone(), config.offset)?;
        let refresher = Arc::new(InfoRefresher::new(sources, Arc::clone(&composer)));

        let initial = initial_frame(refresher.as_ref(), &composer).await;

        Ok(Self {
            config,
            composer,
            refresher,
            frame: Arc::new(FrameHandle::new(initial)),
        })
    }

    /// Take over the framebuffer and keyboard and run until asked to stop.
    pub async fn run(self) -> Result<Exit, StartupError> {
        let mut display = Framebuffer::new(&self.config.framebuffer);
        display.on()?;
        check_dimensions(&display, &self.composer)?;

        let input = match Keyboard::new() {
            Ok(keyboard) => Some(keyboard),
            Err(err) => {
                log::warn!(
                    target: "STARTUP",
                    "no terminal input ({}); stop the kiosk with SIGINT or SIGTERM",
                    err
                );
                None
            }
        };

        let render_loop = RenderLoop {
            display,
            input,
            scheduler: RefreshScheduler::new(self.refresher, Arc::clone(&self.frame)),
            composer: self.composer,
            frame: self.frame,
            offset: self.config.offset,
            tick: TICK,
            refresh_every: REFRESH_EVERY,
        };

        Ok(render_loop.run().await)
    }
}

/// The first info frame. If it cannot be composed the bare background stands in until the
/// next refresh cycle succeeds.
async fn initial_frame(refresher: &impl Refresh, composer: &Composer) -> InfoFrame {
    match refresher.refresh().await {
        Ok(frame) => {
            log::info!(target: "STARTUP", "initial info frame ready");
            frame
        }
        Err(err) => {
            log::error!(
                target: "STARTUP",
                "initial info frame failed, showing the bare background: {}",
                err
            );
            composer.background_frame()
        }
    }
}

fn check_dimensions(display: &impl Display, composer: &Composer) -> Result<(), StartupError> {
    let (display_width, display_height) = display.get_dimensions();
    let (width, height) = composer.dimensions();

    if (width, height) != (display_width, display_height) {
        return Err(DisplayError::Size {
            width,
            height,
            display_width,
            display_height,
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;
    use crate::dust::{DustGrade, DustReading};
    use crate::error::DrawError;
    use crate::frame::{Bitmap, DisplayFrame};
    use crate::sources::Readings;
    use crate::weather::{Precipitation, WeatherObservation};

    fn composer() -> Arc<Composer> {
        Arc::new(Composer::new(
            Bitmap::filled(96, 54, [0x10, 0x20, 0x30, 0xFF]),
            Fonts::system(),
        ))
    }

    struct Canned(Readings);

    impl Gather for Canned {
        fn gather(&self) -> impl Future<Output = Readings> + Send {
            let readings = self.0.clone();
            async move { readings }
        }
    }

    struct Failing;

    impl Refresh for Failing {
        fn refresh(&self) -> impl Future<Output = Result<InfoFrame, RefreshError>> + Send {
            async { Err(RefreshError::Draw(DrawError::from(piet::Error::NotSupported))) }
        }
    }

    struct Fixed(usize, usize);

    impl Display for Fixed {
        type Err = io::Error;

        fn on(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn off(&mut self) -> io::Result<()> {
            Ok(())
        }

        fn get_dimensions(&self) -> (usize, usize) {
            (self.0, self.1)
        }

        fn draw(&mut self, _frame: &DisplayFrame) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_refresh_composes_gathered_readings() {
        let readings = Readings {
            news: Some(Vec::new()),
            weather: Some(WeatherObservation {
                temperature_celsius: "5".to_string(),
                precipitation: Precipitation::Rain,
            }),
            dust: Some(DustReading {
                grade: DustGrade::Moderate,
                value: "30".to_string(),
            }),
        };
        let composer = composer();
        let refresher = InfoRefresher::new(Canned(readings.clone()), Arc::clone(&composer));

        let frame = refresher.refresh().await.unwrap();

        assert_eq!(frame, composer.compose_info(&readings).unwrap());
    }

    #[tokio::test]
    async fn test_failed_initial_frame_falls_back_to_background() {
        let composer = composer();

        let frame = initial_frame(&Failing, &composer).await;

        assert_eq!(frame, composer.background_frame());
    }

    #[tokio::test]
    async fn test_initial_frame_uses_refresh_result() {
        let composer = composer();
        let refresher = InfoRefresher::new(Canned(Readings::default()), Arc::clone(&composer));

        let frame = initial_frame(&refresher, &composer).await;

        assert_eq!(frame, composer.compose_info(&Readings::default()).unwrap());
    }

    #[test]
    fn test_display_must_match_frame_size() {
        let composer = composer();

        assert!(check_dimensions(&Fixed(96, 54), &composer).is_ok());
        assert!(matches!(
            check_dimensions(&Fixed(1920, 1080), &composer),
            Err(StartupError::Display(DisplayError::Size {
                width: 96,
                height: 54,
                display_width: 1920,
                display_height: 1080,
            }))
        ));
    }
}
