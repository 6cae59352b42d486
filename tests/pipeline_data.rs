use anyhow::Result;
use glam::{Mat4, Vec3};

use deimos::prelude::*;

#[derive(Debug, Default, PartialEq)]
struct FrameCounter(u32);

#[derive(Debug, PartialEq)]
struct Camera {
    view: Mat4,
    projection: Mat4,
}

fn camera() -> Camera {
    Camera {
        view: Mat4::look_at_rh(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO, Vec3::Y),
        projection: Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0),
    }
}

#[test]
pub fn create_twice_is_duplicate() -> Result<()> {
    let mut data = PipelineData::new();
    data.create::<FrameCounter>()?.0 = 4;
    let err = data.create::<FrameCounter>().unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::DuplicateData(_))));
    // The first value is kept
    assert_eq!(data.get::<FrameCounter>()?, &FrameCounter(4));
    Ok(())
}

#[test]
pub fn set_after_create_is_duplicate() -> Result<()> {
    let mut data = PipelineData::new();
    data.create::<FrameCounter>()?;
    let err = data.set(FrameCounter(7)).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::DuplicateData(_))));
    assert!(err.to_string().contains("FrameCounter"));
    Ok(())
}

#[test]
pub fn get_missing_fails() -> Result<()> {
    let data = PipelineData::new();
    let err = data.get::<Camera>().unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::MissingData(_))));
    assert!(err.to_string().contains("Camera"));
    Ok(())
}

#[test]
pub fn create_again_after_remove_or_clear() -> Result<()> {
    let mut data = PipelineData::new();
    data.set(FrameCounter(1))?;
    assert_eq!(data.remove::<FrameCounter>(), Some(FrameCounter(1)));
    assert!(!data.has::<FrameCounter>());
    data.set(FrameCounter(2))?;

    data.clear();
    assert!(data.is_empty());
    data.set(FrameCounter(3))?;
    assert_eq!(data.get::<FrameCounter>()?.0, 3);
    Ok(())
}

#[test]
pub fn values_are_keyed_by_type() -> Result<()> {
    let mut data = PipelineData::new();
    data.set(camera())?;
    data.create::<FrameCounter>()?;
    data.set(Vec3::ONE)?;
    assert_eq!(data.len(), 3);

    data.get_mut::<FrameCounter>()?.0 += 10;
    assert_eq!(data.get::<FrameCounter>()?.0, 10);
    assert_eq!(data.get::<Camera>()?, &camera());
    assert_eq!(*data.get::<Vec3>()?, Vec3::ONE);
    // Mat4 itself was never stored, only as a field of Camera
    assert!(!data.has::<Mat4>());
    Ok(())
}

#[test]
pub fn remove_missing_returns_none() {
    let mut data = PipelineData::new();
    assert_eq!(data.remove::<FrameCounter>(), None);
    assert!(data.get_mut::<FrameCounter>().is_err());
}
