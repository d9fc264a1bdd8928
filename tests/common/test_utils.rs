use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::Cursor,
    rc::Rc,
};

use futures::{FutureExt, future::LocalBoxFuture};
use image::{ImageFormat, Rgba, RgbaImage};
use reqwest::Url;
use swatch_ngin::{
    Engine, EngineConfig, MeshNode,
    camera::CameraPose,
    render::SceneRenderer,
    resources::source::{Fetched, RemoteSource},
};

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// The three customizable shoe parts plus an inert sole.
pub(crate) fn shoe_nodes() -> Vec<MeshNode> {
    vec![
        MeshNode::new(1, "Shape027_upper", "Upper"),
        MeshNode::new(2, "Shape026_laces", "Laces"),
        MeshNode::new(3, "Line040_tag", "Tag"),
        MeshNode::new(4, "Sole_main", "Rubber"),
    ]
}

pub(crate) fn png_bytes(width: u32, height: u32, colour: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(colour));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encoding fixture png");
    bytes
}

/// Remote source answering from a fixed table and recording every fetch.
#[derive(Default)]
pub(crate) struct MockRemote {
    responses: RefCell<HashMap<String, Result<Vec<u8>, String>>>,
    fetches: RefCell<Vec<String>>,
}

impl MockRemote {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn serve(&self, url: &str, bytes: Vec<u8>) {
        self.responses.borrow_mut().insert(url.to_string(), Ok(bytes));
    }

    pub(crate) fn fail(&self, url: &str, reason: &str) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), Err(reason.to_string()));
    }

    pub(crate) fn fetches(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }
}

impl RemoteSource for MockRemote {
    fn fetch(&self, url: Url) -> LocalBoxFuture<'static, anyhow::Result<Fetched>> {
        self.fetches.borrow_mut().push(url.to_string());
        let response = self
            .responses
            .borrow()
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(format!("404 for {url}")));
        async move {
            match response {
                Ok(bytes) => Ok(Fetched {
                    bytes: bytes.into(),
                    format: None,
                }),
                Err(reason) => Err(anyhow::anyhow!(reason)),
            }
        }
        .boxed_local()
    }
}

pub(crate) fn engine_with(remote: &Rc<MockRemote>, config: EngineConfig) -> Engine {
    init_logger();
    let mut engine = Engine::with_remote(config, remote.clone());
    engine.load_scene(&shoe_nodes());
    engine
}

pub(crate) fn engine(remote: &Rc<MockRemote>) -> Engine {
    engine_with(remote, EngineConfig::default())
}

/// Renderer that paints every pass in its own solid colour.
pub(crate) struct MockRenderer {
    pub(crate) pose: CameraPose,
    pub(crate) frame_size: (u32, u32),
    pub(crate) colours: Vec<[u8; 4]>,
    pub(crate) fail_on_pass: Option<usize>,
    pub(crate) empty_on_pass: Option<usize>,
    pub(crate) rendered_poses: Vec<CameraPose>,
    pub(crate) pose_writes: Cell<usize>,
}

impl MockRenderer {
    pub(crate) fn new(pose: CameraPose) -> Self {
        Self {
            pose,
            frame_size: (192, 108),
            colours: vec![
                [200, 0, 0, 255],
                [0, 200, 0, 255],
                [0, 0, 200, 255],
                [200, 200, 0, 255],
            ],
            fail_on_pass: None,
            empty_on_pass: None,
            rendered_poses: Vec::new(),
            pose_writes: Cell::new(0),
        }
    }
}

impl SceneRenderer for MockRenderer {
    fn camera_pose(&self) -> CameraPose {
        self.pose
    }

    fn set_camera_pose(&mut self, pose: &CameraPose) {
        self.pose_writes.set(self.pose_writes.get() + 1);
        self.pose = *pose;
    }

    fn render_frame(&mut self) -> anyhow::Result<RgbaImage> {
        let pass = self.rendered_poses.len();
        self.rendered_poses.push(self.pose);
        if self.fail_on_pass == Some(pass) {
            anyhow::bail!("device lost");
        }
        if self.empty_on_pass == Some(pass) {
            return Ok(RgbaImage::new(0, 0));
        }
        let colour = self.colours[pass % self.colours.len()];
        Ok(RgbaImage::from_pixel(
            self.frame_size.0,
            self.frame_size.1,
            Rgba(colour),
        ))
    }
}
