// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use keystone_plugins::{
    install, DisplaySettings, HeadlessSwitch, JoystickModule, JoystickPort, KeyAction,
    KeyboardModule, MouseModule, PlatformModule, PluginOptions,
};
use keystone_sdk::prelude::*;
use std::time::{Duration, Instant};

const FRAMES: u64 = 120;
const TARGET_FRAME_TIME: Duration = Duration::from_millis(16);
const JOYSTICK_FRAME: u64 = 40;
const HEADLESS_FRAMES: std::ops::Range<u64> = 70..90;
const SPACE_KEY: i32 = 32;

fn load_config() -> Result<FrameworkConfig> {
    match std::env::args().nth(1) {
        Some(path) => FrameworkConfig::from_file(&path)
            .with_context(|| format!("loading sandbox config from '{}'", path)),
        None => Ok(FrameworkConfig::default()),
    }
}

fn main() -> Result<()> {
    let config = load_config()?;
    let mut framework = Framework::new(config);

    let headless = HeadlessSwitch::default();
    let port = JoystickPort::new();
    install(
        &mut framework,
        PluginOptions {
            headless: headless.clone(),
            display: DisplaySettings {
                title: "Keystone Sandbox".to_owned(),
                ..DisplaySettings::default()
            },
            joystick_ports: vec![port.clone()],
        },
    )?;
    framework.start()?;

    for frame in 1..=FRAMES {
        let started = Instant::now();

        if frame == JOYSTICK_FRAME {
            log::info!("Sandbox: plugging in a joystick");
            port.connect();
            port.set_button(0, true);
        }
        headless.set(HEADLESS_FRAMES.contains(&frame));

        framework
            .instance_mut::<MouseModule>()?
            .move_by(4.0, (frame as f32 * 0.1).sin() * 3.0);
        let space = if frame % 30 < 15 {
            KeyAction::Press
        } else {
            KeyAction::Release
        };
        framework
            .instance_mut::<KeyboardModule>()?
            .queue(SPACE_KEY, space);
        framework.tick()?;

        if let Some(remaining) = TARGET_FRAME_TIME.checked_sub(started.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    let platform = framework.instance::<PlatformModule>()?.platform()?;
    let joystick = framework
        .instance::<JoystickModule>()?
        .connected_name()
        .map(str::to_owned);
    log::info!(
        "Sandbox: ran {} frames on {} (joystick: {})",
        framework.frame().frame,
        platform,
        joystick.as_deref().unwrap_or("none")
    );

    let report = framework.shutdown()?;
    if !report.is_clean() {
        anyhow::bail!("{} modules failed to dispose", report.failures().len());
    }
    Ok(())
}
