mod test_extrusion_basic;
mod test_surface_basic;
