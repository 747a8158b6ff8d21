mod pre_auth_tests;
