//! Scan actor - owns the camera scan controller and serialises access to it

use tokio::sync::mpsc;

use crate::messages::scan::{ScanCommand, ScanResponse, ScanSource};
use crate::qr::scanner::{LoopEvent, ScanController};

pub struct ScanActor {
    controller: ScanController,
    loop_rx: mpsc::UnboundedReceiver<LoopEvent>,
    response_tx: mpsc::UnboundedSender<ScanResponse>,
}

impl ScanActor {
    pub fn new(
        controller: ScanController,
        loop_rx: mpsc::UnboundedReceiver<LoopEvent>,
        response_tx: mpsc::UnboundedSender<ScanResponse>,
    ) -> Self {
        ScanActor {
            controller,
            loop_rx,
            response_tx,
        }
    }

    /// Run the scan actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<ScanCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ScanCommand::Shutdown) | None => {
                            self.controller.stop();
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd),
                    }
                }

                Some(event) = self.loop_rx.recv() => {
                    match self.controller.on_loop_event(event) {
                        Some(Ok(result)) => {
                            let _ = self.response_tx.send(ScanResponse::Detected {
                                result,
                                source: ScanSource::Camera,
                            });
                        }
                        Some(Err(e)) => {
                            let _ = self.response_tx.send(ScanResponse::failed(&e, true));
                        }
                        None => {}
                    }
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: ScanCommand) {
        let response = match cmd {
            ScanCommand::Start => match self.controller.start() {
                Ok(true) => Some(ScanResponse::Started {
                    has_flash: self.controller.has_flash(),
                }),
                Ok(false) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "Camera start failed");
                    Some(ScanResponse::failed(&e, false))
                }
            },
            ScanCommand::Stop => {
                self.controller.stop();
                Some(ScanResponse::Stopped)
            }
            ScanCommand::ToggleFlash => match self.controller.toggle_flash() {
                Ok(on) => Some(ScanResponse::FlashChanged { on }),
                Err(e) => {
                    tracing::warn!(error = %e, "Flash toggle failed");
                    Some(ScanResponse::failed(&e, false))
                }
            },
            ScanCommand::ScanImage(path) => {
                tracing::info!(path = %path.display(), "Scanning still image");
                // Off the actor loop; Stop is handled while this decodes
                let scan = self.controller.scan_image_file(path);
                let response_tx = self.response_tx.clone();
                tokio::spawn(async move {
                    let response = match scan.await {
                        Ok(result) => ScanResponse::Detected {
                            result,
                            source: ScanSource::Image,
                        },
                        Err(e) => ScanResponse::failed(&e, false),
                    };
                    let _ = response_tx.send(response);
                });
                None
            }
            ScanCommand::Shutdown => None,
        };

        if let Some(response) = response {
            let _ = self.response_tx.send(response);
        }
    }
}
