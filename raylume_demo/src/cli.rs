use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "raylume_demo",
    version,
    about = "Headless Raylume pipeline: noise, temporal accumulation, tone mapping"
)]
pub struct Cli {
    /// Number of frames to render.
    #[arg(long, default_value_t = 16)]
    pub frames: u32,

    /// Output width in pixels.
    #[arg(long, default_value_t = 64)]
    pub width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 64)]
    pub height: u32,

    /// Seed for the noise source.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Move the camera before this frame, restarting accumulation.
    #[arg(long, value_name = "FRAME")]
    pub move_camera_at: Option<u32>,

    /// Resize the output before this frame.
    #[arg(long, value_name = "FRAME")]
    pub resize_at: Option<u32>,

    /// Exposure applied before tone mapping.
    #[arg(long, default_value_t = 1.0)]
    pub exposure: f32,

    /// Log lifecycle detail (channel requests, resets).
    #[arg(short, long)]
    pub verbose: bool,
}
