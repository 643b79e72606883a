mod club_flow_test;
