pub mod quantum_box;
