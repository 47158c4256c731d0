use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use dicom_window::{
    Error, Frame, FrameStore, Interpolation, Preset, SharedWindow, WindowParameters,
    WindowedImage,
};

fn single_frame(samples: Vec<i32>, width: usize, height: usize) -> Arc<FrameStore> {
    let store = Arc::new(FrameStore::new());
    store
        .load([Frame::new(samples, width, height).unwrap()])
        .unwrap();
    store
}

/// A ramp of values from -1024 upwards, one per pixel.
fn ramp(width: usize, height: usize) -> Vec<i32> {
    (0..width * height).map(|i| i as i32 * 7 - 1024).collect()
}

#[test]
fn test_render_is_idempotent() {
    let store = single_frame(ramp(37, 23), 37, 23);
    let image = WindowedImage::new(store, Arc::new(SharedWindow::new(WindowParameters::new(-100, 900))))
        .with_target_size(101, 47)
        .with_interpolation(Interpolation::Bilinear);

    let first = image.render().unwrap();
    let second = image.render().unwrap();
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn test_render_is_monotonic() {
    let samples: Vec<i32> = (-2000..2000).collect();
    let store = single_frame(samples, 4000, 1);
    let image = WindowedImage::new(store, Arc::new(SharedWindow::default()));

    for preset in Preset::ALL {
        image.apply_preset(preset);
        let raster = image.render().unwrap();
        assert!(
            raster.as_raw().windows(2).all(|pair| pair[0] <= pair[1]),
            "{preset} is not monotonic"
        );
    }
}

#[test]
fn test_abdomen_boundary_exactness() {
    let store = single_frame(vec![-160, 240, 40], 3, 1);
    let image = WindowedImage::new(store, Arc::new(SharedWindow::default()));
    image.set_level(40);
    image.set_width(400);

    assert_eq!(image.render().unwrap().into_raw(), vec![0, 255, 128]);
}

#[test]
fn test_zero_width_threshold() {
    let store = single_frame(vec![-32768, -1, 0, 1, 32767], 5, 1);
    let image = WindowedImage::new(store, Arc::new(SharedWindow::new(WindowParameters::new(0, 0))));

    assert_eq!(image.render().unwrap().into_raw(), vec![0, 0, 255, 255, 255]);
}

#[test]
fn test_circular_navigation() {
    let store = FrameStore::new();
    store
        .load((0..3).map(|i| Frame::new(vec![i], 1, 1).unwrap()))
        .unwrap();

    store.select(-1).unwrap();
    assert_eq!(store.active_index(), Some(2));
    store.select(3).unwrap();
    assert_eq!(store.active_index(), Some(0));
}

#[test]
fn test_errors_before_load() {
    let store = Arc::new(FrameStore::new());
    assert_eq!(store.load(Vec::<Frame>::new()), Err(Error::EmptyInput));
    assert_eq!(store.active().unwrap_err(), Error::EmptyStore);

    let image = WindowedImage::new(store, Arc::new(SharedWindow::default()));
    assert_eq!(image.render().unwrap_err(), Error::NoActiveFrame);
}

#[test]
fn test_render_uses_one_window_snapshot() {
    let (width, height) = (256, 64);
    let store = single_frame(ramp(width, height), width, height);
    let window = Arc::new(SharedWindow::default());
    let image = WindowedImage::new(store, Arc::clone(&window));

    let old = WindowParameters::new(-500, 300);
    let new = WindowParameters::new(4000, 300);
    window.set(old);
    let old_raster = image.render().unwrap().into_raw();
    window.set(new);
    let new_raster = image.render().unwrap().into_raw();
    assert_ne!(old_raster, new_raster);

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let window = Arc::clone(&window);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                window.set(old);
                window.set_level(new.level);
            }
        })
    };

    for _ in 0..200 {
        let raster = image.render().unwrap().into_raw();
        assert!(
            raster == old_raster || raster == new_raster,
            "raster mixes window parameters"
        );
    }

    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}

#[test]
fn test_load_swaps_frames_and_index_together() {
    let store = Arc::new(FrameStore::new());
    let sequence = |count: i32| (0..count).map(move |_| Frame::new(vec![count], 1, 1).unwrap());
    store.load(sequence(1)).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let writer = {
        let store = Arc::clone(&store);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut count = 1;
            while !stop.load(Ordering::Relaxed) {
                count = count % 7 + 1;
                store.load(sequence(count)).unwrap();
                store.previous().unwrap();
            }
        })
    };

    for _ in 0..2000 {
        let (index, count, frame) = store.snapshot().unwrap();
        assert!(index < count);
        assert_eq!(frame.samples()[[0, 0]] as usize, count);
    }

    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();
}

/// Source coordinate of an output pixel, using pixel centres.
fn source_coordinate(dst: u32, dst_len: u32, src_len: usize) -> f32 {
    let src = (dst as f32 + 0.5) / dst_len as f32 * src_len as f32 - 0.5;
    src.max(0.0).min((src_len - 1) as f32)
}

#[test]
fn test_upscale_stays_within_native_neighbours() {
    let (width, height) = (9, 7);
    let samples: Vec<i32> = (0..width * height)
        .map(|i| ((i * 37) % 97) as i32 * 10 - 400)
        .collect();
    let store = single_frame(samples, width, height);
    let window = Arc::new(SharedWindow::new(Preset::Abdomen.parameters()));

    let native = WindowedImage::new(Arc::clone(&store), Arc::clone(&window))
        .render()
        .unwrap();

    for interpolation in [Interpolation::Nearest, Interpolation::Bilinear] {
        let (target_w, target_h) = (31, 25);
        let image = WindowedImage::new(Arc::clone(&store), Arc::clone(&window))
            .with_interpolation(interpolation)
            .with_target_size(target_w, target_h);
        let raster = image.render().unwrap();
        assert_eq!(raster.dimensions(), (target_w, target_h));

        for (x, y, pixel) in raster.enumerate_pixels() {
            let sx = source_coordinate(x, target_w, width);
            let sy = source_coordinate(y, target_h, height);
            let xs = [sx.floor() as u32, (sx.ceil() as u32).min(width as u32 - 1)];
            let ys = [sy.floor() as u32, (sy.ceil() as u32).min(height as u32 - 1)];

            let mut neighbours = Vec::with_capacity(4);
            for ny in ys {
                for nx in xs {
                    neighbours.push(native.get_pixel(nx, ny).0[0]);
                }
            }
            let lo = *neighbours.iter().min().unwrap();
            let hi = *neighbours.iter().max().unwrap();
            let value = pixel.0[0];
            assert!(
                (lo..=hi).contains(&value),
                "{interpolation:?} pixel ({x}, {y}) = {value} outside [{lo}, {hi}]"
            );
        }
    }
}
