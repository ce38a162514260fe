use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use time::UtcOffset;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;

use crate::config;
use crate::display::Display;
use crate::image::Composer;
use crate::input::{Exit, Input};
use crate::scheduler::{FrameHandle, Refresh, RefreshScheduler};

/// Drives the screen: one clock frame per tick, and a background refresh every
/// `refresh_every` ticks.
pub struct RenderLoop<D, I, R> {
    pub display: D,
    pub input: I,
    pub scheduler: RefreshScheduler<R>,
    pub composer: Arc<Composer>,
    pub frame: Arc<FrameHandle>,
    pub offset: UtcOffset,
    pub tick: Duration,
    pub refresh_every: u32,
}

impl<D: Display, I: Input, R: Refresh> RenderLoop<D, I, R> {
    /// Run until an interrupt or terminate signal, or an exit key.
    pub async fn run(self) -> Exit {
        match shutdown_signals() {
            Ok(quit) => self.run_until(quit).await,
            Err(err) => {
                log::error!(target: "RENDER", "cannot listen for signals: {}", err);
                self.run_until(std::future::pending()).await
            }
        }
    }

    /// Run until `quit` completes or an exit key is pressed. The in-flight refresh, if any, is
    /// abandoned rather than awaited.
    pub async fn run_until(mut self, quit: impl Future<Output = ()>) -> Exit {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(quit);

        let mut ticks = 0;
        let exit = loop {
            tokio::select! {
                _ = &mut quit => break Exit::Quit,
                _ = interval.tick() => {}
            }

            match self.input.poll_exit() {
                Ok(Some(exit)) => break exit,
                Ok(None) => {}
                Err(err) => log::error!(target: "RENDER", "reading input failed: {}", err),
            }

            ticks += 1;
            if ticks >= self.refresh_every {
                self.scheduler.trigger();
                ticks = 0;
            }

            self.show();
        };

        log::info!(target: "RENDER", "exiting ({:?})", exit);
        self.scheduler.shutdown();
        if let Err(err) = self.display.off() {
            log::error!(target: "RENDER", "could not switch display off: {}", err);
        }
        exit
    }

    /// Stamp the clock on the current info frame and put it on screen. Failures cost one tick.
    fn show(&mut self) {
        let info = self.frame.current();
        let frame = match self
            .composer
            .compose_clock(&info, config::now_local(self.offset))
        {
            Ok(frame) => frame,
            Err(err) => {
                log::error!(target: "RENDER", "{}", err);
                return;
            }
        };

        if let Err(err) = self.display.draw(&frame) {
            log::error!(target: "RENDER", "{}", err);
        }
    }
}

/// Completes on the first SIGINT or SIGTERM. The handlers are in place once this returns, so
/// a signal arriving before the future is first polled is not lost.
pub fn shutdown_signals() -> io::Result<impl Future<Output = ()>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => log::info!(target: "RENDER", "interrupt received"),
            _ = terminate.recv() => log::info!(target: "RENDER", "terminate received"),
        }
    })
}
